//! Synthesis request validation

use ai_speech::OutputFormat;

use crate::error::ValidationError;
use crate::types::SynthesisRequest;

/// Validates raw synthesis input into a [`SynthesisRequest`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SpeechRequestValidator;

impl SpeechRequestValidator {
    /// Create a new validator
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validate `text` and `format`
    ///
    /// Emptiness of the trimmed text is checked before the format, so a
    /// request that is invalid on both counts reports `EmptyText`. Format
    /// matching is case-sensitive.
    pub fn validate(&self, text: &str, format: &str) -> Result<SynthesisRequest, ValidationError> {
        if text.trim().is_empty() {
            return Err(ValidationError::EmptyText);
        }

        let format = OutputFormat::parse(format)
            .ok_or_else(|| ValidationError::UnsupportedFormat(format.to_string()))?;

        Ok(SynthesisRequest::new(text, format))
    }
}
