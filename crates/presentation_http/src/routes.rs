//! Route definitions

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
};
use infrastructure::ServerConfig;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{handlers, middleware::RequestIdLayer, state::AppState};

/// Allowance for multipart framing on top of the upload ceiling
pub const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    let upload_limit = usize::try_from(state.transcription_service.max_upload_bytes())
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD_BYTES);
    let json_limit = state.config.server.max_body_size_json_bytes;
    let cors = cors_layer(&state.config.server);

    Router::new()
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::health_check))
        .route(
            "/transcribe",
            post(handlers::transcribe::transcribe).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/text-to-speech",
            post(handlers::speech::text_to_speech).layer(DefaultBodyLimit::max(json_limit)),
        )
        // first added = innermost
        .layer(TraceLayer::new_for_http())
        .layer(RequestIdLayer::new())
        .layer(cors)
        .with_state(state)
}

/// CORS policy; an empty origin list allows any origin
fn cors_layer(server: &ServerConfig) -> CorsLayer {
    if server.allowed_origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = server
        .allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
}
