//! Whisper transcription engine
//!
//! Reads an uploaded file, decodes it to mono, resamples to 16 kHz and
//! hands the waveform to an [`InferenceBackend`].

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::decoder::WaveformDecoder;
use crate::error::DecodeError;
use crate::ports::{InferenceBackend, TranscriptionEngine};
use crate::resampler::LinearResampler;

/// Transcription engine with a pluggable inference backend
pub struct WhisperEngine {
    decoder: WaveformDecoder,
    resampler: LinearResampler,
    backend: Arc<dyn InferenceBackend>,
}

impl fmt::Debug for WhisperEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WhisperEngine")
            .field("model", &self.backend.model_name())
            .field("target_rate", &self.resampler.target_rate())
            .field("max_duration_secs", &self.decoder.max_duration_secs())
            .finish_non_exhaustive()
    }
}

impl WhisperEngine {
    /// Create an engine over `backend`, resampling to 16 kHz
    #[must_use]
    pub fn new(backend: Arc<dyn InferenceBackend>) -> Self {
        Self {
            decoder: WaveformDecoder::new(),
            resampler: LinearResampler::default(),
            backend,
        }
    }

    /// Reject uploads that decode to more than `secs` seconds of audio
    #[must_use]
    pub fn with_max_duration_secs(mut self, secs: u64) -> Self {
        self.decoder = self.decoder.with_max_duration_secs(secs);
        self
    }

    /// Check whether the inference backend is ready
    pub async fn is_ready(&self) -> bool {
        self.backend.is_available().await
    }
}

#[async_trait]
impl TranscriptionEngine for WhisperEngine {
    #[instrument(skip(self), fields(model = %self.backend.model_name()))]
    async fn transcribe(&self, path: &Path) -> Result<String, DecodeError> {
        let data = tokio::fs::read(path).await?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        // Dropping this future (caller timeout) cancels the blocking decode
        let cancel = CancellationToken::new();
        let worker_cancel = cancel.clone();
        let _cancel_on_drop = cancel.drop_guard();

        let decoder = self.decoder;
        let resampler = self.resampler;
        let waveform = tokio::task::spawn_blocking(move || {
            let decoded =
                decoder.decode_until_cancelled(data, extension.as_deref(), &worker_cancel)?;
            if worker_cancel.is_cancelled() {
                return Err(DecodeError::Cancelled);
            }
            resampler.resample(decoded)
        })
        .await
        .map_err(|e| DecodeError::Unreadable(format!("decode task failed: {e}")))??;

        debug!(
            samples = waveform.len(),
            duration_ms = waveform.duration_ms(),
            "Waveform ready for inference"
        );

        let raw = self.backend.infer(waveform).await?;
        let text = raw.trim().to_string();

        info!(text_len = text.len(), "Transcription complete");

        Ok(text)
    }

    fn model_name(&self) -> &str {
        self.backend.model_name()
    }
}
