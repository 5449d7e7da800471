//! Request and response types of the orchestrators

use ai_speech::OutputFormat;
use serde::{Deserialize, Serialize};

/// Transcription result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transcript {
    text: String,
}

impl Transcript {
    /// Wrap the engine's output
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// The transcribed text
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Consume into the transcribed text
    #[must_use]
    pub fn into_text(self) -> String {
        self.text
    }
}

/// Synthesis input as received, before validation
#[derive(Debug, Clone, Deserialize)]
pub struct RawSynthesisInput {
    /// Text to synthesize
    pub content: String,
    /// Requested output format name
    pub output_format: String,
}

/// A validated synthesis request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisRequest {
    text: String,
    format: OutputFormat,
}

impl SynthesisRequest {
    pub(crate) fn new(text: impl Into<String>, format: OutputFormat) -> Self {
        Self {
            text: text.into(),
            format,
        }
    }

    /// Text as submitted
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Output format
    #[must_use]
    pub const fn format(&self) -> OutputFormat {
        self.format
    }
}

/// Successful synthesis result with base64-encoded audio
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SynthesisResponse {
    /// Text as submitted
    pub text: String,
    /// Output format
    pub output_format: OutputFormat,
    /// Standard base64 of the provider's audio bytes
    pub audio: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthesis_response_serializes_format_name() {
        let response = SynthesisResponse {
            text: "Hi".to_string(),
            output_format: OutputFormat::OggVorbis,
            audio: "AAE=".to_string(),
        };

        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["output_format"], "ogg_vorbis");
        assert_eq!(json["audio"], "AAE=");
        assert_eq!(json["text"], "Hi");
    }

    #[test]
    fn transcript_round_trips_text() {
        let transcript = Transcript::new("Hello World");
        assert_eq!(transcript.text(), "Hello World");
        assert_eq!(transcript.into_text(), "Hello World");
    }
}
