//! Synthesis service - validation, provider call and response encoding

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use ai_speech::{ByteStream, ProviderError, SynthesisProvider};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures::StreamExt;
use tracing::{debug, info, instrument, warn};

use crate::error::SynthesisError;
use crate::types::{RawSynthesisInput, SynthesisRequest, SynthesisResponse};
use crate::validation::SpeechRequestValidator;

/// Settings for the synthesis flow
#[derive(Debug, Clone)]
pub struct SynthesisSettings {
    /// Bound on the provider call, including reading the full audio stream
    pub timeout: Duration,
}

impl Default for SynthesisSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}

/// Orchestrates request validation and speech synthesis
pub struct SynthesisService {
    provider: Arc<dyn SynthesisProvider>,
    validator: SpeechRequestValidator,
    settings: SynthesisSettings,
}

impl fmt::Debug for SynthesisService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SynthesisService")
            .field("voice", &self.provider.voice_id())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl SynthesisService {
    /// Create a service with default settings
    pub fn new(provider: Arc<dyn SynthesisProvider>) -> Self {
        Self::with_settings(provider, SynthesisSettings::default())
    }

    /// Create a service with custom settings
    pub fn with_settings(provider: Arc<dyn SynthesisProvider>, settings: SynthesisSettings) -> Self {
        Self {
            provider,
            validator: SpeechRequestValidator::new(),
            settings,
        }
    }

    /// Validate, synthesize and base64-encode one request
    ///
    /// Single attempt. Any provider failure, including one in the middle of
    /// the audio stream, yields `ProviderUnavailable` and no partial audio.
    #[instrument(skip(self, input), fields(
        text_len = input.content.len(),
        format = %input.output_format,
        voice = %self.provider.voice_id()
    ))]
    pub async fn handle_synthesis_request(
        &self,
        input: RawSynthesisInput,
    ) -> Result<SynthesisResponse, SynthesisError> {
        let request = self
            .validator
            .validate(&input.content, &input.output_format)?;

        let audio =
            match tokio::time::timeout(self.settings.timeout, self.fetch_audio(&request)).await {
                Ok(Ok(audio)) => audio,
                Ok(Err(e)) => {
                    warn!(reason = %e.reason(), "Synthesis provider failed");
                    return Err(SynthesisError::ProviderUnavailable);
                },
                Err(_) => {
                    warn!(
                        timeout_ms = self.settings.timeout.as_millis(),
                        "Synthesis timed out"
                    );
                    return Err(SynthesisError::ProviderUnavailable);
                },
            };

        info!(audio_bytes = audio.len(), "Synthesis complete");

        Ok(SynthesisResponse {
            text: input.content,
            output_format: request.format(),
            audio: STANDARD.encode(&audio),
        })
    }

    async fn fetch_audio(&self, request: &SynthesisRequest) -> Result<Vec<u8>, ProviderError> {
        let stream = self
            .provider
            .synthesize(request.text(), request.format())
            .await?;
        collect_stream(stream).await
    }
}

async fn collect_stream(mut stream: ByteStream) -> Result<Vec<u8>, ProviderError> {
    let mut audio = Vec::new();
    while let Some(chunk) = stream.next().await {
        audio.extend_from_slice(&chunk?);
    }
    debug!(bytes = audio.len(), "Provider stream drained");
    Ok(audio)
}
