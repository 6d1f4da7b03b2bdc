//! Relay Web Server - HTTP ingest for the relay queue.
//!
//! This binary provides a thin web server that:
//! - Accepts raw message bodies on `POST /queues/:queue/messages`
//! - Publishes them to RabbitMQ unchanged
//! - Exposes `GET /health`

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use relay::web::{router, AppState};
use relay::{shutdown, AmqpQueue, Config, MessageQueue};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("web_server_starting");

    let config = Config::from_env();
    info!(port = config.port, "config_loaded");

    let queue = AmqpQueue::new(config.cloudamqp_url.clone());
    let app = router(AppState::new(Arc::new(queue.clone())));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "web_server_listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown::signal().await;
            info!("web_server_shutting_down");
        })
        .await
        .context("Server error")?;

    queue.close().await.context("Failed to close queue")?;

    info!("web_server_shutdown_complete");

    Ok(())
}
