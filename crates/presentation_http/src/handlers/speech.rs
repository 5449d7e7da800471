//! Text-to-speech handler

use application::{RawSynthesisInput, SynthesisResponse};
use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use crate::{error::ApiError, middleware::JsonBody, state::AppState};

/// Success envelope of `POST /text-to-speech`
#[derive(Debug, Clone, Serialize)]
pub struct SpeechResponse {
    pub message: String,
    pub data: SynthesisResponse,
}

/// `POST /text-to-speech`
///
/// Body `{"content": <text>, "output_format": "mp3" | "ogg_vorbis" | "pcm"}`.
#[instrument(skip(state, input))]
pub async fn text_to_speech(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<RawSynthesisInput>,
) -> Result<Json<SpeechResponse>, ApiError> {
    let data = state
        .synthesis_service
        .handle_synthesis_request(input)
        .await?;

    Ok(Json(SpeechResponse {
        message: "Audio conversion complete".to_string(),
        data,
    }))
}
