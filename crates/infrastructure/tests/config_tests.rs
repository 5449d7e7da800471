//! Integration tests for configuration loading
#![allow(clippy::unwrap_used)]

use std::io::Write;
use std::time::Duration;

use ai_speech::{EngineBackend, build_engine};
use infrastructure::{AppConfig, AppConfigError, LogFormat};

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn full_config_file_loads_and_validates() {
    let file = write_config(
        r#"
        [server]
        host = "0.0.0.0"
        port = 8080
        log_format = "json"
        allowed_origins = ["http://localhost:5173"]

        [transcription]
        max_upload_bytes = 10485760
        timeout_ms = 60000

        [synthesis]
        timeout_ms = 15000

        [speech.engine]
        backend = "openai"

        [speech.engine.openai]
        api_key = "sk-test"

        [speech.synthesis]
        region = "eu-west-1"
        access_key_id = "AKIDEXAMPLE"
        secret_access_key = "secret"
        voice_id = "Amy"
        "#,
    );

    let config = AppConfig::load_from(file.path()).unwrap();
    config.validate().unwrap();

    assert_eq!(config.server.bind_address(), "0.0.0.0:8080");
    assert_eq!(config.server.log_format, LogFormat::Json);
    assert_eq!(config.server.allowed_origins, vec!["http://localhost:5173"]);
    assert_eq!(config.transcription.settings().max_upload_bytes, 10_485_760);
    assert_eq!(
        config.transcription.settings().timeout,
        Duration::from_secs(60)
    );
    assert_eq!(config.synthesis.settings().timeout, Duration::from_secs(15));
    assert_eq!(config.speech.engine.backend, EngineBackend::OpenAi);
    assert_eq!(config.speech.synthesis.voice_id, "Amy");
}

#[test]
fn hosted_engine_builds_from_loaded_config() {
    let file = write_config(
        r#"
        [speech.engine]
        backend = "openai"

        [speech.engine.openai]
        api_key = "sk-test"
        model = "whisper-large"
        "#,
    );

    let config = AppConfig::load_from(file.path()).unwrap();
    let engine = build_engine(&config.speech.engine).unwrap();

    assert_eq!(ai_speech::TranscriptionEngine::model_name(&engine), "whisper-large");
}

#[test]
fn engine_duration_ceiling_is_loaded() {
    let file = write_config(
        r#"
        [speech.engine]
        max_audio_duration_secs = 600
        "#,
    );

    let config = AppConfig::load_from(file.path()).unwrap();
    let engine = build_engine(&config.speech.engine).unwrap();

    assert_eq!(config.speech.engine.max_audio_duration_secs, 600);
    assert!(format!("{engine:?}").contains("max_duration_secs: 600"));
}

#[test]
fn zero_synthesis_timeout_is_rejected() {
    let file = write_config(
        r#"
        [synthesis]
        timeout_ms = 0

        [speech.synthesis]
        access_key_id = "AKIDEXAMPLE"
        secret_access_key = "secret"
        "#,
    );

    let config = AppConfig::load_from(file.path()).unwrap();

    assert!(matches!(config.validate(), Err(AppConfigError::Invalid(_))));
}

#[test]
fn malformed_file_is_a_load_error() {
    let file = write_config("[server\nport = ");

    assert!(matches!(
        AppConfig::load_from(file.path()),
        Err(AppConfigError::Load(_))
    ));
}
