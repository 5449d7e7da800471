//! Concrete adapters for the speech ports
//!
//! - [`WhisperEngine`] implements `TranscriptionEngine` on top of an
//!   `InferenceBackend` ([`WhisperCppBackend`] or [`OpenAiWhisperBackend`])
//! - [`PollySynthesisProvider`] implements `SynthesisProvider`

pub mod openai;
pub mod polly;
mod sigv4;
pub mod whisper_cpp;
pub mod whisper_engine;

pub use openai::OpenAiWhisperBackend;
pub use polly::PollySynthesisProvider;
pub use whisper_cpp::WhisperCppBackend;
pub use whisper_engine::WhisperEngine;
