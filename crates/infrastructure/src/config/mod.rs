//! Application configuration
//!
//! Split into focused sub-modules:
//! - `server`: HTTP server settings
//! - `pipeline`: transcription and synthesis flow limits
//!
//! Adapter settings live in [`ai_speech::SpeechConfig`] under `speech`.

mod pipeline;
mod server;

use std::path::Path;

use ai_speech::SpeechConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub use pipeline::{SynthesisConfig, TranscriptionConfig};
pub use server::{LogFormat, ServerConfig};

/// Environment variable prefix, e.g. `ECHO__SERVER__PORT`
const ENV_PREFIX: &str = "ECHO";

/// Separator between nested keys in environment variables
const ENV_SEPARATOR: &str = "__";

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum AppConfigError {
    /// A source could not be read or deserialized
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// A section failed validation
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Transcription flow configuration
    #[serde(default)]
    pub transcription: TranscriptionConfig,

    /// Synthesis flow configuration
    #[serde(default)]
    pub synthesis: SynthesisConfig,

    /// Engine and provider adapter configuration
    #[serde(default)]
    pub speech: SpeechConfig,
}

impl AppConfig {
    /// Load configuration from `config.toml` (optional) and environment
    ///
    /// Environment variables use prefix `ECHO` and `__` between nested
    /// keys, e.g. `ECHO__SPEECH__SYNTHESIS__REGION=eu-west-1`.
    pub fn load() -> Result<Self, AppConfigError> {
        Self::load_with(
            config::File::with_name("config").required(false),
            Self::environment(),
        )
    }

    /// Load configuration from an explicit file path and environment
    pub fn load_from(path: &Path) -> Result<Self, AppConfigError> {
        Self::load_with(config::File::from(path), Self::environment())
    }

    fn environment() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("server.allowed_origins")
    }

    fn load_with(
        file: config::File<config::FileSourceFile, config::FileFormat>,
        environment: config::Environment,
    ) -> Result<Self, AppConfigError> {
        let config = config::Config::builder()
            .add_source(file)
            .add_source(environment)
            .build()?;

        let app_config: Self = config.try_deserialize()?;
        debug!(
            host = %app_config.server.host,
            port = app_config.server.port,
            max_upload_bytes = app_config.transcription.max_upload_bytes,
            "Configuration loaded"
        );
        Ok(app_config)
    }

    /// Validate every section
    ///
    /// Both adapters are checked, so missing credentials fail at startup
    /// rather than on the first request.
    pub fn validate(&self) -> Result<(), AppConfigError> {
        self.server.validate().map_err(AppConfigError::Invalid)?;
        self.transcription
            .validate()
            .map_err(AppConfigError::Invalid)?;
        self.synthesis.validate().map_err(AppConfigError::Invalid)?;
        self.speech
            .engine
            .validate()
            .map_err(AppConfigError::Invalid)?;
        self.speech
            .synthesis
            .validate()
            .map_err(AppConfigError::Invalid)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::time::Duration;

    use ai_speech::EngineBackend;
    use secrecy::ExposeSecret;

    use super::*;

    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let source: config::Map<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AppConfig::environment().source(Some(source))
    }

    fn toml_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn load(file: &tempfile::NamedTempFile, vars: &[(&str, &str)]) -> AppConfig {
        AppConfig::load_with(config::File::from(file.path()), env(vars)).unwrap()
    }

    #[test]
    fn app_config_default() {
        let config = AppConfig::default();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.log_format, LogFormat::Text);
        assert_eq!(config.server.shutdown_timeout_secs, 30);
        assert_eq!(config.transcription.max_upload_bytes, 52_428_800);
        assert_eq!(config.transcription.timeout_ms, 120_000);
        assert_eq!(config.synthesis.timeout_ms, 30_000);
        assert_eq!(config.speech.synthesis.voice_id, "Joanna");
    }

    #[test]
    fn empty_file_yields_defaults() {
        let file = toml_file("");
        let config = load(&file, &[]);

        assert_eq!(config.server.port, 8000);
        assert_eq!(config.transcription.max_upload_bytes, 52_428_800);
        assert_eq!(config.speech.engine.backend, EngineBackend::WhisperCpp);
    }

    #[test]
    fn file_values_are_loaded() {
        let file = toml_file(
            r#"
            [server]
            port = 9000
            log_format = "json"

            [transcription]
            max_upload_bytes = 1024
            temp_dir = "/var/tmp/echo"

            [speech.synthesis]
            region = "eu-central-1"
            voice_id = "Vicki"
            "#,
        );

        let config = load(&file, &[]);

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.log_format, LogFormat::Json);
        assert_eq!(config.transcription.max_upload_bytes, 1024);
        assert_eq!(
            config.transcription.temp_dir.as_deref(),
            Some(Path::new("/var/tmp/echo"))
        );
        assert_eq!(config.speech.synthesis.region, "eu-central-1");
        assert_eq!(config.speech.synthesis.voice_id, "Vicki");
    }

    #[test]
    fn environment_overrides_file() {
        let file = toml_file("[server]\nport = 9000\n");

        let config = load(
            &file,
            &[
                ("ECHO__SERVER__PORT", "9100"),
                ("ECHO__TRANSCRIPTION__MAX_UPLOAD_BYTES", "2048"),
                ("ECHO__SPEECH__SYNTHESIS__ACCESS_KEY_ID", "AKIDEXAMPLE"),
                ("ECHO__SPEECH__SYNTHESIS__SECRET_ACCESS_KEY", "secret"),
                (
                    "ECHO__SERVER__ALLOWED_ORIGINS",
                    "http://localhost:3000,https://echo.example",
                ),
            ],
        );

        assert_eq!(config.server.port, 9100);
        assert_eq!(config.transcription.max_upload_bytes, 2048);
        assert_eq!(
            config
                .speech
                .synthesis
                .access_key_id
                .as_ref()
                .unwrap()
                .expose_secret(),
            "AKIDEXAMPLE"
        );
        assert_eq!(
            config.server.allowed_origins,
            vec!["http://localhost:3000", "https://echo.example"]
        );
    }

    #[test]
    fn validate_requires_synthesis_credentials() {
        let err = AppConfig::default().validate().unwrap_err();
        assert!(matches!(err, AppConfigError::Invalid(msg) if msg.contains("AWS credentials")));
    }

    #[test]
    fn validate_rejects_zero_upload_ceiling() {
        let mut config = AppConfig::default();
        config.transcription.max_upload_bytes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_accepts_complete_config() {
        let file = toml_file(
            r#"
            [speech.synthesis]
            access_key_id = "AKIDEXAMPLE"
            secret_access_key = "secret"
            "#,
        );

        assert!(load(&file, &[]).validate().is_ok());
    }

    #[test]
    fn settings_carry_configured_limits() {
        let config = AppConfig::default();

        let transcription = config.transcription.settings();
        let synthesis = config.synthesis.settings();

        assert_eq!(transcription.max_upload_bytes, 52_428_800);
        assert_eq!(transcription.timeout, Duration::from_secs(120));
        assert_eq!(synthesis.timeout, Duration::from_secs(30));
    }

    #[test]
    fn bind_address_joins_host_and_port() {
        assert_eq!(ServerConfig::default().bind_address(), "127.0.0.1:8000");
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let result = AppConfig::load_from(Path::new("/nonexistent/echo.toml"));
        assert!(matches!(result, Err(AppConfigError::Load(_))));
    }

    #[test]
    fn config_debug_redacts_secrets() {
        let file = toml_file(
            r#"
            [speech.synthesis]
            access_key_id = "AKIDEXAMPLE"
            secret_access_key = "super-secret"
            "#,
        );

        let debug = format!("{:?}", load(&file, &[]));

        assert!(!debug.contains("super-secret"));
        assert!(!debug.contains("AKIDEXAMPLE"));
    }
}
