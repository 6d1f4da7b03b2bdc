//! Queue module: named channels that fan messages out to subscribers.
//!
//! This module provides:
//! - The `MessageQueue` trait and the `Callback` subscriber type
//! - `InMemoryQueue`, an in-process queue with per-subscriber FIFO workers
//! - `AmqpQueue`, a RabbitMQ-backed queue
//!
//! ## Ordering
//!
//! Every implementation delivers to a given subscriber in publish order and
//! awaits the subscriber's future before handing it the next message.

pub mod amqp;
pub mod memory;

use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};

use crate::error::TransportError;

pub use amqp::AmqpQueue;
pub use memory::InMemoryQueue;

/// Subscriber invoked once per message published on its queue.
pub type Callback = Arc<dyn Fn(String) -> BoxFuture<'static, ()> + Send + Sync>;

/// Wrap an async closure as a `Callback`.
pub fn callback<F, Fut>(f: F) -> Callback
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Arc::new(move |message: String| f(message).boxed())
}

/// Run `callback` on `message` to completion. Returns `false` if the
/// subscriber panicked, either while building its future or while polling it.
pub(crate) async fn invoke(callback: &Callback, message: String) -> bool {
    match panic::catch_unwind(AssertUnwindSafe(|| callback(message))) {
        Ok(fut) => AssertUnwindSafe(fut).catch_unwind().await.is_ok(),
        Err(_) => false,
    }
}

/// A named-channel message queue.
#[async_trait]
pub trait MessageQueue: Send + Sync {
    /// Hand `message` to every subscriber of `queue` without waiting for them.
    /// A queue with no subscribers drops the message.
    async fn publish(&self, queue: &str, message: String) -> Result<(), TransportError>;

    /// Register `callback` for all messages published on `queue` from now on.
    async fn subscribe(&self, queue: &str, callback: Callback) -> Result<(), TransportError>;

    /// Remove every subscription on every queue.
    async fn close(&self) -> Result<(), TransportError>;
}
