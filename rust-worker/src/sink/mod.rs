//! Delivery sinks for transformed payloads.
//!
//! This module provides:
//! - The `Sink` trait the handler delivers through
//! - `HttpSink`, which POSTs JSON to `base_url + endpoint`
//! - `RecordingSink`, an in-memory sink that records every call

pub mod http;
pub mod memory;

use async_trait::async_trait;

use crate::error::DeliveryError;
use crate::message::OutboundPayload;

pub use http::HttpSink;
pub use memory::{RecordingSink, SinkCall};

/// Downstream delivery target.
///
/// A failed delivery must surface as `Err`; the handler relies on it to
/// decide whether to report a failure.
#[async_trait]
pub trait Sink: Send + Sync {
    /// Deliver `payload` to `endpoint`. One attempt, no retry.
    async fn deliver(&self, endpoint: &str, payload: &OutboundPayload) -> Result<(), DeliveryError>;
}
