//! In-process queue.
//!
//! Each subscription owns an unbounded channel drained by a dedicated task,
//! which awaits the callback for one message before taking the next. That
//! gives FIFO delivery per subscriber while publishers never wait on
//! subscribers, and a slow or panicking subscriber never holds up another.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot, RwLock};
use tracing::{debug, error, info, warn};

use crate::error::TransportError;

use super::{invoke, Callback, MessageQueue};

enum Envelope {
    Message(String),
    Flush(oneshot::Sender<()>),
}

#[derive(Clone)]
struct Subscription {
    id: u64,
    tx: mpsc::UnboundedSender<Envelope>,
}

/// In-process `MessageQueue`.
///
/// Must be used from within a tokio runtime: `subscribe` spawns the
/// subscriber's worker task.
#[derive(Default)]
pub struct InMemoryQueue {
    subscriptions: RwLock<HashMap<String, Vec<Subscription>>>,
    next_id: std::sync::atomic::AtomicU64,
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of subscribers currently registered on `queue`.
    pub async fn subscriber_count(&self, queue: &str) -> usize {
        self.subscriptions
            .read()
            .await
            .get(queue)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Wait until every message published before this call has been handled
    /// by every subscriber registered at the time of the call.
    pub async fn flush(&self) {
        let snapshot: Vec<Subscription> = self
            .subscriptions
            .read()
            .await
            .values()
            .flatten()
            .cloned()
            .collect();

        let mut pending = Vec::with_capacity(snapshot.len());
        for sub in snapshot {
            let (done_tx, done_rx) = oneshot::channel();
            if sub.tx.send(Envelope::Flush(done_tx)).is_ok() {
                pending.push(done_rx);
            }
        }

        // A dropped sender means the worker has already exited.
        futures::future::join_all(pending).await;
    }
}

#[async_trait]
impl MessageQueue for InMemoryQueue {
    async fn publish(&self, queue: &str, message: String) -> Result<(), TransportError> {
        // Copy the subscriber list so concurrent subscribe/close cannot
        // disturb this fan-out.
        let subscribers = match self.subscriptions.read().await.get(queue) {
            Some(subs) => subs.clone(),
            None => Vec::new(),
        };

        debug!(
            queue = %queue,
            subscribers = subscribers.len(),
            body_length = message.len(),
            "memory_queue_publish"
        );

        for sub in subscribers {
            if sub.tx.send(Envelope::Message(message.clone())).is_err() {
                warn!(queue = %queue, subscriber_id = sub.id, "memory_subscriber_gone");
            }
        }

        Ok(())
    }

    async fn subscribe(&self, queue: &str, callback: Callback) -> Result<(), TransportError> {
        let id = self
            .next_id
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(run_subscriber(queue.to_string(), id, callback, rx));

        self.subscriptions
            .write()
            .await
            .entry(queue.to_string())
            .or_default()
            .push(Subscription { id, tx });

        info!(queue = %queue, subscriber_id = id, "memory_queue_subscribed");
        Ok(())
    }

    async fn close(&self) -> Result<(), TransportError> {
        let removed: usize = {
            let mut subscriptions = self.subscriptions.write().await;
            let count = subscriptions.values().map(Vec::len).sum();
            subscriptions.clear();
            count
        };

        info!(subscriptions_removed = removed, "memory_queue_closed");
        Ok(())
    }
}

/// Drain one subscriber's channel in order until every sender is dropped.
async fn run_subscriber(
    queue: String,
    id: u64,
    callback: Callback,
    mut rx: mpsc::UnboundedReceiver<Envelope>,
) {
    while let Some(envelope) = rx.recv().await {
        match envelope {
            Envelope::Message(message) => {
                if !invoke(&callback, message).await {
                    error!(queue = %queue, subscriber_id = id, "memory_subscriber_panicked");
                }
            }
            Envelope::Flush(done) => {
                let _ = done.send(());
            }
        }
    }

    debug!(queue = %queue, subscriber_id = id, "memory_subscriber_stopped");
}
