//! Transcription and synthesis flow configuration.

use std::path::PathBuf;
use std::time::Duration;

use application::{DEFAULT_MAX_UPLOAD_BYTES, SynthesisSettings, TranscriptionSettings};
use serde::{Deserialize, Serialize};

/// Transcription flow configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionConfig {
    /// Upload ceiling in bytes (default: 50 MiB)
    #[serde(default = "default_max_upload")]
    pub max_upload_bytes: u64,

    /// Bound on one engine call in milliseconds
    #[serde(default = "default_transcription_timeout")]
    pub timeout_ms: u64,

    /// Directory for scoped upload files (default: system temp dir)
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,
}

const fn default_max_upload() -> u64 {
    DEFAULT_MAX_UPLOAD_BYTES
}

const fn default_transcription_timeout() -> u64 {
    120_000 // 2 minutes
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: default_max_upload(),
            timeout_ms: default_transcription_timeout(),
            temp_dir: None,
        }
    }
}

impl TranscriptionConfig {
    /// Settings for the transcription service
    #[must_use]
    pub fn settings(&self) -> TranscriptionSettings {
        TranscriptionSettings {
            max_upload_bytes: self.max_upload_bytes,
            timeout: Duration::from_millis(self.timeout_ms),
            temp_dir: self.temp_dir.clone(),
        }
    }

    /// Validate the section
    pub fn validate(&self) -> Result<(), String> {
        if self.max_upload_bytes == 0 {
            return Err("transcription.max_upload_bytes must be greater than 0".to_string());
        }
        if self.timeout_ms == 0 {
            return Err("transcription.timeout_ms must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Synthesis flow configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisConfig {
    /// Bound on one provider call in milliseconds
    #[serde(default = "default_synthesis_timeout")]
    pub timeout_ms: u64,
}

const fn default_synthesis_timeout() -> u64 {
    30_000 // 30 seconds
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_synthesis_timeout(),
        }
    }
}

impl SynthesisConfig {
    /// Settings for the synthesis service
    #[must_use]
    pub const fn settings(&self) -> SynthesisSettings {
        SynthesisSettings {
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }

    /// Validate the section
    pub fn validate(&self) -> Result<(), String> {
        if self.timeout_ms == 0 {
            return Err("synthesis.timeout_ms must be greater than 0".to_string());
        }
        Ok(())
    }
}
