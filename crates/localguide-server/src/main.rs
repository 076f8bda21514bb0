//! HTTP server entry point.
//!
//! Loads configuration from the environment, builds the model backend once,
//! and serves the router on `0.0.0.0:$PORT` until Ctrl-C or SIGTERM.

use std::sync::Arc;

use anyhow::Result;
use localguide_config::ServiceConfig;
use localguide_llm::backend_for;
use localguide_server::services::guide::AttractionGuide;
use localguide_server::{build_router, telemetry, ServerState};
use tokio::signal;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = ServiceConfig::from_env()?;
    let _telemetry = telemetry::init(&config.telemetry)?;

    info!(
        auth_mode = %config.auth_mode(),
        tracing_enabled = config.telemetry.enabled,
        "Configuration loaded (model: {})",
        config.model
    );

    let state = Arc::new(ServerState::new(AttractionGuide::new(backend_for(&config))));
    let app = build_router(state);

    let addr = config.socket_addr();
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
