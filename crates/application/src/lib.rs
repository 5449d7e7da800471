//! Application layer - admission, validation and request orchestration
//!
//! Sits between the HTTP boundary and the speech adapters. Every adapter
//! failure is translated into one of the closed error enums in [`error`].

pub mod admission;
pub mod error;
pub mod services;
pub mod types;
pub mod validation;

pub use admission::{AudioAdmissionGuard, DEFAULT_MAX_UPLOAD_BYTES};
pub use error::{
    AdmissionError, SynthesisError, TranscriptionError, UploadError, ValidationError,
};
pub use services::{
    SynthesisService, SynthesisSettings, TranscriptionService, TranscriptionSettings,
};
pub use types::{RawSynthesisInput, SynthesisRequest, SynthesisResponse, Transcript};
pub use validation::SpeechRequestValidator;
