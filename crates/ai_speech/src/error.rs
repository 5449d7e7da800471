//! Speech adapter errors
//!
//! Each adapter boundary has one closed error type. Engine failures of any
//! kind surface as [`DecodeError`], provider failures of any kind surface as
//! the opaque [`ProviderError`].

use thiserror::Error;

/// Errors raised by the transcription engine adapter
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The uploaded file could not be read from its scoped location
    #[error("Failed to read audio: {0}")]
    Io(String),

    /// Container or codec could not be probed or decoded
    #[error("Unreadable audio: {0}")]
    Unreadable(String),

    /// The stream decoded to zero samples
    #[error("No audio samples decoded")]
    NoAudio,

    /// The decoded stream is longer than the configured ceiling
    #[error("Audio exceeds {max_secs}s")]
    TooLong { max_secs: u64 },

    /// The caller abandoned the request before decoding finished
    #[error("Decoding cancelled")]
    Cancelled,

    /// Sample-rate conversion failed
    #[error("Resampling failed: {0}")]
    Resample(String),

    /// The inference backend failed to produce a transcript
    #[error("Inference failed: {0}")]
    Inference(String),

    /// The inference backend is not installed or not reachable
    #[error("Engine not available: {0}")]
    Unavailable(String),

    /// The inference backend did not answer in time
    #[error("Transcription timeout after {0}ms")]
    Timeout(u64),
}

impl From<reqwest::Error> for DecodeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            Self::Unavailable(err.to_string())
        } else {
            Self::Inference(err.to_string())
        }
    }
}

impl From<std::io::Error> for DecodeError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Opaque failure of the speech synthesis provider
///
/// Network, authentication, quota and malformed-response failures all
/// collapse into this type. The reason is kept for logging only and is
/// not part of the `Display` output.
#[derive(Debug, Error)]
#[error("Speech synthesis provider failed")]
pub struct ProviderError {
    reason: String,
}

impl ProviderError {
    /// Create a provider error with a log-only reason
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// The underlying reason, for logs
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::new("request timed out")
        } else if err.is_connect() {
            Self::new(format!("connection failed: {err}"))
        } else {
            Self::new(format!("request failed: {err}"))
        }
    }
}

/// Invalid adapter configuration, raised at construction time
#[derive(Debug, Error)]
#[error("Configuration error: {0}")]
pub struct ConfigurationError(pub String);
