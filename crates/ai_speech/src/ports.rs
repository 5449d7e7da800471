//! Port definitions for speech processing
//!
//! Defines the traits (ports) that the gateway consumes. Concrete adapters
//! live in [`crate::providers`].

use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
#[cfg(test)]
use mockall::automock;

use crate::error::{DecodeError, ProviderError};
use crate::types::{DecodedWaveform, OutputFormat};

/// Raw audio byte stream returned by a synthesis provider
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, ProviderError>> + Send>>;

/// Port for the transcription engine
///
/// The engine owns the full decode pipeline: it reads the audio at `path`,
/// normalizes it to [`crate::TARGET_SAMPLE_RATE`] mono and runs inference.
/// Every internal failure is reported as a [`DecodeError`].
///
/// # Example
///
/// ```ignore
/// use ai_speech::TranscriptionEngine;
///
/// async fn transcribe_upload(engine: &dyn TranscriptionEngine, path: &Path) -> Option<String> {
///     engine.transcribe(path).await.ok()
/// }
/// ```
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TranscriptionEngine: Send + Sync {
    /// Transcribe the audio file at `path`
    ///
    /// The returned text has leading and trailing whitespace removed.
    async fn transcribe(&self, path: &Path) -> Result<String, DecodeError>;

    /// Name of the underlying model
    fn model_name(&self) -> &str;
}

/// Process-wide engine shared by every transcription request
pub type EngineHandle = Arc<dyn TranscriptionEngine>;

/// Port for a speech recognition model
///
/// Receives audio already normalized to 16 kHz mono. Batch size is one.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Run inference over one waveform
    async fn infer(&self, waveform: DecodedWaveform) -> Result<String, DecodeError>;

    /// Check if the backend is installed and reachable
    async fn is_available(&self) -> bool;

    /// Name of the model
    fn model_name(&self) -> &str;
}

/// Port for the speech synthesis provider
///
/// Implementations use a fixed voice chosen at construction time.
#[async_trait]
pub trait SynthesisProvider: Send + Sync {
    /// Synthesize `text` in `format` and return the audio byte stream
    async fn synthesize(
        &self,
        text: &str,
        format: OutputFormat,
    ) -> Result<ByteStream, ProviderError>;

    /// Voice used for synthesis
    fn voice_id(&self) -> &str;
}
