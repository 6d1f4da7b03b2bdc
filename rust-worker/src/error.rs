//! Error kinds for the relay pipeline.
//!
//! Per-message failures (`DecodeError`, `DeliveryError`) never leave the
//! handler; they are folded into a `HandleError` and reported through the
//! diagnostics channel. `TransportError` is the only error a queue operation
//! returns to its caller.

use thiserror::Error;

/// Raw message text could not be decoded into an `InboundMessage`.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl DecodeError {
    /// True when the text was not well-formed JSON at all, as opposed to
    /// valid JSON with missing or mistyped fields.
    pub fn is_syntax(&self) -> bool {
        match self {
            DecodeError::Malformed(e) => e.is_syntax() || e.is_eof(),
        }
    }
}

/// The sink failed to accept a delivery.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("request to {endpoint} failed: {source}")]
    Request {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {endpoint} timed out after {timeout_ms}ms")]
    Timeout { endpoint: String, timeout_ms: u64 },

    #[error("{endpoint} responded with status {status}")]
    Status { endpoint: String, status: u16 },

    #[error("delivery rejected: {0}")]
    Rejected(String),
}

/// The underlying queue transport failed.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to connect to broker: {0}")]
    Connect(#[source] lapin::Error),

    #[error("failed to open channel: {0}")]
    Channel(#[source] lapin::Error),

    #[error("failed to publish to {queue}: {source}")]
    Publish {
        queue: String,
        #[source]
        source: lapin::Error,
    },

    #[error("failed to consume from {queue}: {source}")]
    Consume {
        queue: String,
        #[source]
        source: lapin::Error,
    },

    #[error("queue is closed")]
    Closed,
}

/// Why a single message was not delivered.
#[derive(Debug, Error)]
pub enum HandleError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

impl HandleError {
    /// Short snake_case label used as the diagnostics event name.
    pub fn kind(&self) -> &'static str {
        match self {
            HandleError::Decode(_) => "relay_message_decode_failed",
            HandleError::Delivery(_) => "relay_message_delivery_failed",
        }
    }
}
