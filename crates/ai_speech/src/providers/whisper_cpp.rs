//! Local whisper.cpp inference backend
//!
//! Writes the normalized waveform to a scratch WAV file and runs the
//! whisper.cpp CLI over it.
//!
//! # Prerequisites
//!
//! - whisper.cpp built and available in PATH (`whisper-cli`)
//! - A GGML model file, e.g. `ggml-small.bin`
//!
//! ```bash
//! git clone https://github.com/ggerganov/whisper.cpp
//! cd whisper.cpp
//! cmake -B build && cmake --build build -j --config Release
//! ./models/download-ggml-model.sh small
//! ```

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, error, instrument, warn};

use crate::config::WhisperCppConfig;
use crate::error::{ConfigurationError, DecodeError};
use crate::ports::InferenceBackend;
use crate::types::DecodedWaveform;

/// Base name of the scratch files inside the per-call directory
const SCRATCH_STEM: &str = "input";

/// Inference backend running the whisper.cpp CLI
#[derive(Debug, Clone)]
pub struct WhisperCppBackend {
    config: WhisperCppConfig,
}

impl WhisperCppBackend {
    /// Create a new whisper.cpp backend
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if the configuration is invalid.
    pub fn new(config: WhisperCppConfig) -> Result<Self, ConfigurationError> {
        config.validate().map_err(ConfigurationError)?;
        Ok(Self { config })
    }

    fn executable(&self) -> &Path {
        &self.config.executable_path
    }

    fn model(&self) -> &Path {
        &self.config.model_path
    }

    /// Run whisper.cpp over `wav_path`, writing `<output_base>.txt`
    #[instrument(skip(self, wav_path, output_base), fields(model = %self.model().display()))]
    async fn run_whisper(&self, wav_path: &Path, output_base: &Path) -> Result<(), DecodeError> {
        let mut cmd = Command::new(self.executable());

        cmd.arg("-m")
            .arg(self.model())
            .arg("-f")
            .arg(wav_path)
            .arg("-otxt")
            .arg("-of")
            .arg(output_base)
            .arg("-nt")
            .arg("-t")
            .arg(self.config.threads.to_string());

        if let Some(ref lang) = self.config.language {
            cmd.arg("-l").arg(lang);
        }

        cmd.stdout(Stdio::piped()).stderr(Stdio::piped()).kill_on_drop(true);

        debug!(command = ?cmd, "Running whisper.cpp");

        let output = cmd.output().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DecodeError::Unavailable(format!(
                    "whisper.cpp not found at '{}'",
                    self.executable().display()
                ))
            } else {
                DecodeError::Inference(format!("Failed to run whisper.cpp: {e}"))
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!(status = %output.status, "whisper.cpp failed");
            return Err(DecodeError::Inference(format!(
                "whisper.cpp exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl InferenceBackend for WhisperCppBackend {
    #[instrument(skip(self, waveform), fields(samples = waveform.len()))]
    async fn infer(&self, waveform: DecodedWaveform) -> Result<String, DecodeError> {
        let wav = waveform.to_wav_bytes()?;

        // Removed with everything inside when dropped
        let scratch = tempfile::tempdir()?;
        let output_base = scratch.path().join(SCRATCH_STEM);
        let wav_path = output_base.with_extension("wav");

        tokio::fs::write(&wav_path, &wav).await?;

        self.run_whisper(&wav_path, &output_base).await?;

        let text = tokio::fs::read_to_string(output_base.with_extension("txt"))
            .await
            .map_err(|e| {
                DecodeError::Inference(format!("Failed to read transcription output: {e}"))
            })?;

        if text.trim().is_empty() {
            warn!("whisper.cpp returned empty transcription");
        }

        Ok(text)
    }

    async fn is_available(&self) -> bool {
        let executable_exists = self.executable().exists() || {
            Command::new(self.executable())
                .arg("--help")
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .await
                .is_ok_and(|s| s.success())
        };

        let model_exists = self.model().exists();

        debug!(
            executable = executable_exists,
            model = model_exists,
            "whisper.cpp availability"
        );

        executable_exists && model_exists
    }

    fn model_name(&self) -> &str {
        self.model()
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("whisper.cpp")
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn test_config() -> WhisperCppConfig {
        WhisperCppConfig {
            executable_path: PathBuf::from("whisper-cli"),
            model_path: PathBuf::from("/models/ggml-base.bin"),
            threads: 4,
            language: Some("en".to_string()),
        }
    }

    #[test]
    fn creates_backend_with_valid_config() {
        assert!(WhisperCppBackend::new(test_config()).is_ok());
    }

    #[test]
    fn rejects_zero_threads() {
        let mut config = test_config();
        config.threads = 0;
        assert!(WhisperCppBackend::new(config).is_err());
    }

    #[test]
    fn model_name_extracts_from_path() {
        let backend = WhisperCppBackend::new(test_config()).unwrap();
        assert_eq!(backend.model_name(), "ggml-base");
    }

    #[test]
    fn model_name_handles_complex_paths() {
        let mut config = test_config();
        config.model_path = PathBuf::from("/home/pi/models/ggml-small.en.bin");
        let backend = WhisperCppBackend::new(config).unwrap();
        assert_eq!(backend.model_name(), "ggml-small.en");
    }

    #[tokio::test]
    async fn is_available_returns_false_when_not_installed() {
        let mut config = test_config();
        config.executable_path = PathBuf::from("/nonexistent/whisper-cli");
        let backend = WhisperCppBackend::new(config).unwrap();

        assert!(!backend.is_available().await);
    }

    #[tokio::test]
    async fn missing_executable_is_unavailable() {
        let mut config = test_config();
        config.executable_path = PathBuf::from("/nonexistent/whisper-cli");
        let backend = WhisperCppBackend::new(config).unwrap();

        let result = backend
            .infer(DecodedWaveform::new(vec![0.0; 160], 16_000))
            .await;

        assert!(matches!(result, Err(DecodeError::Unavailable(_))));
    }
}
