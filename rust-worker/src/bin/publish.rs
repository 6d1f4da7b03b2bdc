//! Relay Publish - push messages onto the relay queue from stdin.
//!
//! Every non-empty line read from stdin is published verbatim to
//! `RELAY_QUEUE`, e.g.
//!
//! ```text
//! echo '{"id":"1","timestamp":"...","data":{...}}' | relay-publish
//! ```

use anyhow::{Context, Result};
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use relay::{AmqpQueue, Config, MessageQueue};

#[tokio::main]
async fn main() -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true).with_writer(std::io::stderr))
        .init();

    let config = Config::from_env();
    let queue = AmqpQueue::new(config.cloudamqp_url.clone());

    let mut lines = BufReader::new(io::stdin()).lines();
    let mut published = 0usize;

    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        queue
            .publish(&config.queue_name, line.to_string())
            .await
            .with_context(|| format!("Failed to publish to {}", config.queue_name))?;
        published += 1;
    }

    queue.close().await.context("Failed to close queue")?;

    info!(queue = %config.queue_name, published = published, "publish_complete");
    Ok(())
}
