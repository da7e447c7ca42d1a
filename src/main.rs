//! Task Agent - HTTP Server Entry Point
//!
//! Starts the HTTP server that exposes `GET /task`.

use task_agent::{api, config::Config};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "task_agent=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(
        agent = %config.agent_name,
        engine_ready = config.engine.is_ready(),
        command_timeout_secs = config.command_timeout.as_secs(),
        "Loaded configuration"
    );

    // Start HTTP server
    info!("Starting server on {}:{}", config.host, config.port);
    api::serve(config).await?;

    Ok(())
}
