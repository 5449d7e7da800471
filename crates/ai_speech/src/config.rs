//! Configuration for the transcription engine and synthesis provider
//!
//! Adapters receive their section at construction time and never read the
//! process environment themselves.

use std::fmt;
use std::path::PathBuf;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::types::DEFAULT_MAX_AUDIO_DURATION_SECS;

/// Speech adapter configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Transcription engine configuration
    #[serde(default)]
    pub engine: EngineConfig,

    /// Speech synthesis provider configuration
    #[serde(default)]
    pub synthesis: PollyConfig,
}

/// Inference backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EngineBackend {
    /// Local whisper.cpp model
    #[default]
    WhisperCpp,
    /// Hosted Whisper API
    #[serde(rename = "openai")]
    OpenAi,
}

/// Transcription engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Inference backend to use
    #[serde(default)]
    pub backend: EngineBackend,

    /// Local whisper.cpp settings
    #[serde(default)]
    pub whisper_cpp: WhisperCppConfig,

    /// Hosted Whisper API settings
    #[serde(default)]
    pub openai: OpenAiWhisperConfig,

    /// Longest decoded upload accepted, in seconds
    #[serde(default = "default_max_audio_duration_secs")]
    pub max_audio_duration_secs: u64,
}

const fn default_max_audio_duration_secs() -> u64 {
    DEFAULT_MAX_AUDIO_DURATION_SECS
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            backend: EngineBackend::default(),
            whisper_cpp: WhisperCppConfig::default(),
            openai: OpenAiWhisperConfig::default(),
            max_audio_duration_secs: default_max_audio_duration_secs(),
        }
    }
}

impl EngineConfig {
    /// Validate the section for the selected backend
    pub fn validate(&self) -> Result<(), String> {
        if self.max_audio_duration_secs == 0 {
            return Err("engine max_audio_duration_secs must be greater than 0".to_string());
        }
        match self.backend {
            EngineBackend::WhisperCpp => self.whisper_cpp.validate(),
            EngineBackend::OpenAi => self.openai.validate(),
        }
    }
}

/// whisper.cpp CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperCppConfig {
    /// Path to the whisper.cpp executable
    #[serde(default = "default_whisper_executable")]
    pub executable_path: PathBuf,

    /// Path to the GGML model file
    #[serde(default = "default_whisper_model")]
    pub model_path: PathBuf,

    /// Number of inference threads
    #[serde(default = "default_threads")]
    pub threads: u16,

    /// Optional language hint (ISO 639-1)
    #[serde(default)]
    pub language: Option<String>,
}

fn default_whisper_executable() -> PathBuf {
    PathBuf::from("whisper-cli")
}

fn default_whisper_model() -> PathBuf {
    PathBuf::from("models/ggml-small.bin")
}

const fn default_threads() -> u16 {
    4
}

impl Default for WhisperCppConfig {
    fn default() -> Self {
        Self {
            executable_path: default_whisper_executable(),
            model_path: default_whisper_model(),
            threads: default_threads(),
            language: None,
        }
    }
}

impl WhisperCppConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.threads == 0 {
            return Err("whisper.cpp threads must be greater than 0".to_string());
        }
        if self.model_path.as_os_str().is_empty() {
            return Err("whisper.cpp model path is required".to_string());
        }
        Ok(())
    }
}

/// Hosted Whisper API configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct OpenAiWhisperConfig {
    /// API key (sensitive)
    #[serde(default, skip_serializing)]
    pub api_key: Option<SecretString>,

    /// API base URL
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,

    /// Transcription model
    #[serde(default = "default_stt_model")]
    pub model: String,

    /// HTTP request timeout in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_stt_model() -> String {
    "whisper-1".to_string()
}

const fn default_request_timeout_ms() -> u64 {
    30000 // 30 seconds
}

impl Default for OpenAiWhisperConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_openai_base_url(),
            model: default_stt_model(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl fmt::Debug for OpenAiWhisperConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiWhisperConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .finish()
    }
}

impl OpenAiWhisperConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.api_key.is_none() {
            return Err("OpenAI API key is required for the openai engine backend".to_string());
        }
        if self.request_timeout_ms == 0 {
            return Err("Request timeout must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// AWS Polly synthesis configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct PollyConfig {
    /// AWS region
    #[serde(default = "default_region")]
    pub region: String,

    /// Access key id (sensitive)
    #[serde(default, skip_serializing)]
    pub access_key_id: Option<SecretString>,

    /// Secret access key (sensitive)
    #[serde(default, skip_serializing)]
    pub secret_access_key: Option<SecretString>,

    /// Endpoint override, e.g. for a local emulator
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Voice used for every synthesis request
    #[serde(default = "default_voice_id")]
    pub voice_id: String,

    /// Polly engine (`standard` or `neural`)
    #[serde(default = "default_polly_engine")]
    pub engine: String,

    /// HTTP request timeout in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_voice_id() -> String {
    "Joanna".to_string()
}

fn default_polly_engine() -> String {
    "standard".to_string()
}

impl Default for PollyConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            access_key_id: None,
            secret_access_key: None,
            endpoint: None,
            voice_id: default_voice_id(),
            engine: default_polly_engine(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl fmt::Debug for PollyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PollyConfig")
            .field("region", &self.region)
            .field(
                "access_key_id",
                &self.access_key_id.as_ref().map(|_| "[REDACTED]"),
            )
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("endpoint", &self.endpoint)
            .field("voice_id", &self.voice_id)
            .field("engine", &self.engine)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .finish()
    }
}

impl PollyConfig {
    /// Create a minimal config for testing
    #[cfg(test)]
    pub fn test() -> Self {
        Self {
            access_key_id: Some(SecretString::from("AKIDEXAMPLE")),
            secret_access_key: Some(SecretString::from(
                "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY",
            )),
            ..Default::default()
        }
    }

    /// Resolved endpoint base URL
    #[must_use]
    pub fn endpoint_url(&self) -> String {
        self.endpoint.clone().unwrap_or_else(|| {
            format!("https://polly.{}.amazonaws.com", self.region)
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.access_key_id.is_none() || self.secret_access_key.is_none() {
            return Err("AWS credentials are required for the synthesis provider".to_string());
        }
        if self.region.trim().is_empty() {
            return Err("AWS region is required".to_string());
        }
        if self.voice_id.trim().is_empty() {
            return Err("Voice id is required".to_string());
        }
        if self.request_timeout_ms == 0 {
            return Err("Request timeout must be greater than 0".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = SpeechConfig::default();

        assert_eq!(config.engine.backend, EngineBackend::WhisperCpp);
        assert_eq!(
            config.engine.whisper_cpp.model_path,
            PathBuf::from("models/ggml-small.bin")
        );
        assert_eq!(config.engine.whisper_cpp.threads, 4);
        assert_eq!(config.engine.openai.model, "whisper-1");
        assert_eq!(config.synthesis.region, "us-east-1");
        assert_eq!(config.synthesis.voice_id, "Joanna");
        assert_eq!(config.synthesis.engine, "standard");
        assert!(config.synthesis.access_key_id.is_none());
    }

    #[test]
    fn polly_validate_fails_without_credentials() {
        assert!(PollyConfig::default().validate().is_err());
    }

    #[test]
    fn polly_validate_succeeds_with_credentials() {
        assert!(PollyConfig::test().validate().is_ok());
    }

    #[test]
    fn polly_validate_fails_with_zero_timeout() {
        let mut config = PollyConfig::test();
        config.request_timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn polly_endpoint_defaults_to_region() {
        let config = PollyConfig {
            region: "eu-central-1".to_string(),
            ..PollyConfig::test()
        };
        assert_eq!(config.endpoint_url(), "https://polly.eu-central-1.amazonaws.com");
    }

    #[test]
    fn polly_endpoint_override_wins() {
        let config = PollyConfig {
            endpoint: Some("http://127.0.0.1:4566".to_string()),
            ..PollyConfig::test()
        };
        assert_eq!(config.endpoint_url(), "http://127.0.0.1:4566");
    }

    #[test]
    fn polly_debug_redacts_credentials() {
        let debug = format!("{:?}", PollyConfig::test());
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("AKIDEXAMPLE"));
    }

    #[test]
    fn openai_backend_requires_api_key() {
        let config = EngineConfig {
            backend: EngineBackend::OpenAi,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn whisper_cpp_backend_rejects_zero_threads() {
        let mut config = EngineConfig::default();
        config.whisper_cpp.threads = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_max_audio_duration_is_rejected() {
        let config = EngineConfig {
            max_audio_duration_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn engine_backend_serializes() {
        let cpp = serde_json::to_string(&EngineBackend::WhisperCpp).unwrap();
        let openai = serde_json::to_string(&EngineBackend::OpenAi).unwrap();

        assert_eq!(cpp, "\"whisper_cpp\"");
        assert_eq!(openai, "\"openai\"");
    }

    #[test]
    fn config_deserializes_from_toml() {
        let toml = r#"
            [engine]
            backend = "openai"

            [engine.openai]
            api_key = "sk-test"
            model = "whisper-large"

            [synthesis]
            region = "eu-west-1"
            access_key_id = "AKID"
            secret_access_key = "secret"
            voice_id = "Matthew"
        "#;

        let config: SpeechConfig = toml::from_str(toml).unwrap();

        assert_eq!(config.engine.backend, EngineBackend::OpenAi);
        assert!(config.engine.openai.api_key.is_some());
        assert_eq!(config.engine.openai.model, "whisper-large");
        assert_eq!(
            config.engine.max_audio_duration_secs,
            DEFAULT_MAX_AUDIO_DURATION_SECS
        );
        assert_eq!(config.synthesis.region, "eu-west-1");
        assert_eq!(config.synthesis.voice_id, "Matthew");
        assert_eq!(config.synthesis.engine, "standard");
        assert!(config.synthesis.validate().is_ok());
    }
}
