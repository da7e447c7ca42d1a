//! HTTP API for task submission.
//!
//! ## Endpoints
//!
//! - `GET /task?q=<description>` - Resolve the task into a shell command, run it, return the output
//! - `GET /api/health` - Health check and suggestion engine readiness

mod routes;
pub mod types;

use std::sync::Arc;

use tracing::info;

use crate::config::Config;

pub use routes::{router, AppState};

/// Bind to the configured address and serve until Ctrl-C.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let state = Arc::new(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        // Without a signal handler keep serving until the process is killed.
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
