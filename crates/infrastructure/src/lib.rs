//! Infrastructure layer - configuration and logging
//!
//! Loads the single [`AppConfig`] the server is wired from and installs
//! the global tracing subscriber.

pub mod config;
pub mod telemetry;

pub use config::{
    AppConfig, AppConfigError, LogFormat, ServerConfig, SynthesisConfig, TranscriptionConfig,
};
pub use telemetry::{TelemetryError, init_logging};
