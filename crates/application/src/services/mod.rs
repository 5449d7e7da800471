//! Request orchestrators

mod synthesis_service;
mod transcription_service;

pub use synthesis_service::{SynthesisService, SynthesisSettings};
pub use transcription_service::{TranscriptionService, TranscriptionSettings};
