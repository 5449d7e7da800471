//! Application state shared across handlers

use std::sync::Arc;

use application::{SynthesisService, TranscriptionService};
use infrastructure::AppConfig;

/// Shared application state
#[derive(Debug, Clone)]
pub struct AppState {
    /// Upload admission and transcription
    pub transcription_service: Arc<TranscriptionService>,
    /// Request validation and speech synthesis
    pub synthesis_service: Arc<SynthesisService>,
    /// Application configuration
    pub config: Arc<AppConfig>,
}
