//! API error types and responses
//!
//! Every failure leaves the server as `{"detail": <message>}`. Internal
//! causes are logged and never echoed.

use application::{SynthesisError, TranscriptionError};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Detail shown for internal faults
const INTERNAL_DETAIL: &str = "Internal server error";

/// Error body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid or empty audio file")]
    EmptyPayload,

    #[error("File too large")]
    PayloadTooLarge,

    #[error("Unsupported or unreadable audio format")]
    UnreadableAudio,

    #[error("Text input cannot be empty")]
    EmptyText,

    #[error("Unsupported output format")]
    UnsupportedFormat,

    #[error("Text-to-speech service unavailable")]
    ProviderUnavailable,

    /// Request shape rejected before reaching a handler body
    #[error("{0}")]
    Unprocessable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for this error
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::EmptyPayload | Self::EmptyText | Self::UnsupportedFormat => {
                StatusCode::BAD_REQUEST
            },
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::UnreadableAudio => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::ProviderUnavailable | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match self {
            Self::Internal(ref msg) => {
                tracing::error!(error = %msg, "Internal error");
                INTERNAL_DETAIL.to_string()
            },
            other => other.to_string(),
        };

        (status, Json(ErrorResponse { detail })).into_response()
    }
}

impl From<TranscriptionError> for ApiError {
    fn from(err: TranscriptionError) -> Self {
        match err {
            TranscriptionError::EmptyPayload => Self::EmptyPayload,
            TranscriptionError::PayloadTooLarge => Self::PayloadTooLarge,
            TranscriptionError::UnreadableAudio => Self::UnreadableAudio,
            TranscriptionError::IncompleteUpload(reason) => Self::Unprocessable(reason),
            TranscriptionError::Storage(msg) => Self::Internal(msg),
        }
    }
}

impl From<SynthesisError> for ApiError {
    fn from(err: SynthesisError) -> Self {
        match err {
            SynthesisError::EmptyText => Self::EmptyText,
            SynthesisError::UnsupportedFormat => Self::UnsupportedFormat,
            SynthesisError::ProviderUnavailable => Self::ProviderUnavailable,
        }
    }
}
