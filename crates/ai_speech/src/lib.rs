//! AI Speech - transcription engine and speech synthesis adapters
//!
//! Provides the ports the gateway consumes and their adapters:
//! - `TranscriptionEngine` - turn an uploaded audio file into text
//! - `SynthesisProvider` - turn text into a stream of encoded audio
//!
//! # Architecture
//!
//! This crate follows the ports & adapters pattern:
//! - `ports` module defines the traits (ports)
//! - `providers` module contains concrete implementations (adapters)
//! - `decoder` and `resampler` normalize any supported container to
//!   16 kHz mono before inference
//!
//! # Supported Providers
//!
//! - whisper.cpp CLI (local inference)
//! - OpenAI-compatible Whisper API (hosted inference)
//! - Amazon Polly (synthesis)
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use ai_speech::{SpeechConfig, TranscriptionEngine, build_engine};
//!
//! let engine = build_engine(&SpeechConfig::default().engine)?;
//! let text = engine.transcribe(Path::new("/tmp/upload.wav")).await?;
//! ```

pub mod config;
pub mod decoder;
pub mod error;
pub mod ports;
pub mod providers;
pub mod resampler;
pub mod types;

use std::sync::Arc;

pub use config::{
    EngineBackend, EngineConfig, OpenAiWhisperConfig, PollyConfig, SpeechConfig,
    WhisperCppConfig,
};
pub use decoder::WaveformDecoder;
pub use error::{ConfigurationError, DecodeError, ProviderError};
pub use ports::{
    ByteStream, EngineHandle, InferenceBackend, SynthesisProvider, TranscriptionEngine,
};
pub use providers::{
    OpenAiWhisperBackend, PollySynthesisProvider, WhisperCppBackend, WhisperEngine,
};
pub use resampler::LinearResampler;
pub use types::{
    DEFAULT_MAX_AUDIO_DURATION_SECS, DecodedWaveform, MIN_SOURCE_SAMPLE_RATE, OutputFormat,
    TARGET_SAMPLE_RATE,
};

/// Build the transcription engine for the configured backend
///
/// # Errors
///
/// Returns `ConfigurationError` if the selected backend is misconfigured.
pub fn build_engine(config: &EngineConfig) -> Result<WhisperEngine, ConfigurationError> {
    let backend: Arc<dyn InferenceBackend> = match config.backend {
        EngineBackend::WhisperCpp => Arc::new(WhisperCppBackend::new(config.whisper_cpp.clone())?),
        EngineBackend::OpenAi => Arc::new(OpenAiWhisperBackend::new(config.openai.clone())?),
    };
    Ok(WhisperEngine::new(backend).with_max_duration_secs(config.max_audio_duration_secs))
}
