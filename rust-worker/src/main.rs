//! Relay Worker - consumes the relay queue and delivers transformed payloads.
//!
//! Each message on `RELAY_QUEUE` is decoded, reshaped and POSTed to
//! `SINK_BASE_URL + SINK_ENDPOINT`. Bad messages and failed deliveries are
//! logged and skipped. The process exits with an error if the broker drops
//! the consumer.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use relay::{bind, shutdown, AmqpQueue, Config, HttpSink, MessageHandler, MessageQueue};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    tracing::info!("worker_starting");

    // Load configuration from environment
    let config = Config::from_env();
    tracing::info!(
        cloudamqp_url_set = !config.cloudamqp_url.is_empty(),
        queue = %config.queue_name,
        sink_base_url = %config.sink_base_url,
        sink_endpoint = %config.sink_endpoint,
        request_timeout_ms = config.request_timeout_ms,
        "config_loaded"
    );

    let sink = HttpSink::new(
        config.sink_base_url.clone(),
        Duration::from_millis(config.request_timeout_ms),
    )
    .context("Failed to create HTTP client")?;

    let handler = Arc::new(MessageHandler::new(Arc::new(sink), config.sink_endpoint.clone()));

    let queue = AmqpQueue::new(config.cloudamqp_url.clone());
    bind(&queue, &config.queue_name, handler)
        .await
        .context("Failed to subscribe to relay queue")?;

    tracing::info!("worker_ready");

    // A lost consumer ends the process so a supervisor can restart it.
    let consumer_lost = tokio::select! {
        _ = shutdown::signal() => false,
        _ = queue.consumer_lost() => true,
    };
    tracing::info!(consumer_lost = consumer_lost, "worker_stopping");

    queue.close().await.context("Failed to close queue")?;

    if consumer_lost {
        bail!("Consumer on {} stopped unexpectedly", config.queue_name);
    }

    tracing::info!("worker_shutdown_complete");
    Ok(())
}
