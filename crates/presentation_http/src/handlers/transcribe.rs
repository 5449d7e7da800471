//! Transcription handler

use application::UploadError;
use axum::{
    Json,
    extract::{
        Multipart, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::StatusCode,
};
use futures::TryStreamExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{error::ApiError, state::AppState};

/// Multipart field carrying the audio file
pub const FILE_FIELD: &str = "file";

/// Success body of `POST /transcribe`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionResponse {
    pub transcription: String,
}

/// `POST /transcribe`
///
/// Streams the `file` part into the transcription service. Other parts are
/// skipped.
#[instrument(skip(state, multipart))]
pub async fn transcribe(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<TranscriptionResponse>, ApiError> {
    let mut multipart = multipart.map_err(|e| ApiError::Unprocessable(e.body_text()))?;

    while let Some(field) = multipart.next_field().await.map_err(reject_body)? {
        if field.name() != Some(FILE_FIELD) {
            debug!(field = ?field.name(), "Skipping multipart field");
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let stream = field.map_err(upload_error);

        let transcript = state
            .transcription_service
            .handle_transcription_request(&file_name, stream)
            .await?;

        return Ok(Json(TranscriptionResponse {
            transcription: transcript.into_text(),
        }));
    }

    Err(ApiError::Unprocessable(format!(
        "Missing multipart field '{FILE_FIELD}'"
    )))
}

/// Errors while reading the file part
fn upload_error(err: MultipartError) -> UploadError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadError::TooLarge
    } else {
        UploadError::Interrupted(err.body_text())
    }
}

/// Errors while locating the next part
fn reject_body(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge
    } else {
        ApiError::Unprocessable(err.body_text())
    }
}
