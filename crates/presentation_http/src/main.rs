//! Echo HTTP Server
//!
//! Main entry point for the speech gateway.

use std::{future::IntoFuture, sync::Arc, time::Duration};

use ai_speech::{PollySynthesisProvider, build_engine};
use anyhow::Context;
use application::{SynthesisService, TranscriptionService};
use infrastructure::{AppConfig, init_logging};
use presentation_http::{routes, state::AppState};
use tokio::{net::TcpListener, signal, sync::oneshot};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    init_logging(config.server.log_format)?;

    info!("Echo v{} starting...", env!("CARGO_PKG_VERSION"));

    config.validate()?;

    let engine = build_engine(&config.speech.engine)
        .context("Failed to initialize transcription engine")?;
    if !engine.is_ready().await {
        tracing::warn!("Transcription backend is not reachable yet");
    }

    let provider = PollySynthesisProvider::new(config.speech.synthesis.clone())
        .context("Failed to initialize synthesis provider")?;

    let transcription_service =
        TranscriptionService::with_settings(Arc::new(engine), config.transcription.settings());
    let synthesis_service =
        SynthesisService::with_settings(Arc::new(provider), config.synthesis.settings());

    let addr = config.server.bind_address();
    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_secs);

    let state = AppState {
        transcription_service: Arc::new(transcription_service),
        synthesis_service: Arc::new(synthesis_service),
        config: Arc::new(config),
    };

    let app = routes::create_router(state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Server listening on http://{}", addr);

    let (signalled_tx, signalled_rx) = oneshot::channel::<()>();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        let _ = signalled_tx.send(());
    });

    // In-flight requests get `shutdown_timeout` to finish once a signal arrives
    let drain_deadline = async move {
        if signalled_rx.await.is_ok() {
            info!("Waiting up to {:?} for connections to close...", shutdown_timeout);
            tokio::time::sleep(shutdown_timeout).await;
        } else {
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        result = server.into_future() => {
            result?;
            info!("Server shutdown complete");
        }
        () = drain_deadline => {
            tracing::warn!("Shutdown timeout elapsed, dropping open connections");
        }
    }

    Ok(())
}

/// Wait for SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
