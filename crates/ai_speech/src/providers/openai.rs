//! Hosted Whisper inference backend
//!
//! Sends the normalized 16 kHz mono waveform as a WAV upload to an
//! OpenAI-compatible `/audio/transcriptions` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::config::OpenAiWhisperConfig;
use crate::error::{ConfigurationError, DecodeError};
use crate::ports::InferenceBackend;
use crate::types::DecodedWaveform;

/// Whisper backend calling a hosted transcription API
#[derive(Debug, Clone)]
pub struct OpenAiWhisperBackend {
    client: Client,
    config: OpenAiWhisperConfig,
}

impl OpenAiWhisperBackend {
    /// Create a new hosted Whisper backend
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if the API key is missing or the HTTP
    /// client cannot be built.
    pub fn new(config: OpenAiWhisperConfig) -> Result<Self, ConfigurationError> {
        config.validate().map_err(ConfigurationError)?;

        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| ConfigurationError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    fn api_key(&self) -> &str {
        self.config
            .api_key
            .as_ref()
            .map_or("", |key| key.expose_secret())
    }

    fn transcriptions_url(&self) -> String {
        format!(
            "{}/audio/transcriptions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

/// Transcription response body
#[derive(Debug, Deserialize)]
struct WhisperResponse {
    text: String,
}

/// API error response body
#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[async_trait]
impl InferenceBackend for OpenAiWhisperBackend {
    #[instrument(skip(self, waveform), fields(samples = waveform.len(), model = %self.config.model))]
    async fn infer(&self, waveform: DecodedWaveform) -> Result<String, DecodeError> {
        let wav = waveform.to_wav_bytes()?;

        let file_part = Part::bytes(wav)
            .file_name("audio.wav")
            .mime_str("audio/wav")
            .map_err(|e| DecodeError::Inference(format!("Invalid MIME type: {e}")))?;

        let form = Form::new()
            .part("file", file_part)
            .text("model", self.config.model.clone());

        let response = self
            .client
            .post(self.transcriptions_url())
            .bearer_auth(self.api_key())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .map_or_else(|_| format!("HTTP {status}: {body}"), |e| e.error.message);
            return Err(DecodeError::Inference(message));
        }

        let parsed: WhisperResponse = response
            .json()
            .await
            .map_err(|e| DecodeError::Inference(format!("Failed to parse response: {e}")))?;

        debug!(text_len = parsed.text.len(), "Hosted inference complete");

        Ok(parsed.text)
    }

    async fn is_available(&self) -> bool {
        let models_url = format!("{}/models", self.config.base_url.trim_end_matches('/'));

        match self
            .client
            .get(&models_url)
            .bearer_auth(self.api_key())
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                warn!(error = %e, "Hosted Whisper availability check failed");
                false
            },
        }
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
