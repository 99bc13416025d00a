//! HTTP server for disaster-zones
//!
//! Provides REST API endpoints for report ingestion and zone queries.

pub mod routes;
pub mod state;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::store::ReportRepository;
use routes::create_router;
use state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Start the HTTP server on the configured address
///
/// Runs until Ctrl-C.
pub async fn run(config: Config) -> Result<()> {
    let addr = config.server_addr();
    run_on(&addr, config).await
}

/// Start the HTTP server with a specific address
///
/// Useful for tests or when you want to override config
pub async fn run_on(addr: &str, config: Config) -> Result<()> {
    let addr: SocketAddr = addr
        .parse()
        .map_err(|e| Error::Server(format!("Invalid server address: {}", e)))?;

    let state = Arc::new(AppState::open(config).await?);
    info!(
        "Serving {} reports ({} index, {} storage)",
        state.service.index().len(),
        state.service.index().name(),
        state.service.repository().name()
    );
    let app = create_router(state);

    info!("Starting server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Server(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::Server(format!("Server error: {}", e)))?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler; run until the process is killed
        std::future::pending::<()>().await;
    }
}
