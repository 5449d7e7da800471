//! Application-level errors

use thiserror::Error;

/// Rejection of an audio payload before any decode attempt
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdmissionError {
    /// Zero-length upload
    #[error("Audio payload is empty")]
    EmptyPayload,

    /// Upload exceeds the configured ceiling
    #[error("Audio payload of {size} bytes exceeds limit of {max} bytes")]
    PayloadTooLarge { size: u64, max: u64 },
}

/// Rejection of a synthesis request body
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Text is empty after trimming
    #[error("Text input cannot be empty")]
    EmptyText,

    /// Format outside the supported set
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),
}

/// Failure while receiving the upload stream
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    /// The transport refused the body for exceeding its size limit
    #[error("Upload exceeds transport limit")]
    TooLarge,

    /// The body ended abnormally
    #[error("Upload interrupted: {0}")]
    Interrupted(String),
}

/// Outcome of a failed transcription request
#[derive(Debug, Error)]
pub enum TranscriptionError {
    /// Zero-length upload
    #[error("Invalid or empty audio file")]
    EmptyPayload,

    /// Upload exceeds the configured ceiling
    #[error("File too large")]
    PayloadTooLarge,

    /// Engine could not decode or transcribe the audio
    #[error("Unsupported or unreadable audio format")]
    UnreadableAudio,

    /// The upload body ended abnormally before the file part was complete
    #[error("Incomplete upload: {0}")]
    IncompleteUpload(String),

    /// Scoped temporary storage could not be created or written
    #[error("Temporary storage failed: {0}")]
    Storage(String),
}

impl From<AdmissionError> for TranscriptionError {
    fn from(err: AdmissionError) -> Self {
        match err {
            AdmissionError::EmptyPayload => Self::EmptyPayload,
            AdmissionError::PayloadTooLarge { .. } => Self::PayloadTooLarge,
        }
    }
}

/// Outcome of a failed synthesis request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SynthesisError {
    /// Text is empty after trimming
    #[error("Text input cannot be empty")]
    EmptyText,

    /// Format outside the supported set
    #[error("Unsupported output format")]
    UnsupportedFormat,

    /// The synthesis provider failed or timed out
    #[error("Text-to-speech service unavailable")]
    ProviderUnavailable,
}

impl From<ValidationError> for SynthesisError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::EmptyText => Self::EmptyText,
            ValidationError::UnsupportedFormat(_) => Self::UnsupportedFormat,
        }
    }
}
