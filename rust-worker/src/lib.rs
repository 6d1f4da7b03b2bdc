//! Relay - consume a queue, reshape each message, deliver it over HTTP.
//!
//! This library provides shared modules for the three relay binaries:
//! - `relay-worker`: subscribes to the queue and delivers to the HTTP sink
//! - `relay-web`: thin HTTP ingest that publishes raw bodies to the queue
//! - `relay-publish`: publishes stdin lines to the queue
//!
//! ## Architecture
//!
//! ```text
//! publisher → Queue → MessageHandler (decode → transform) → Sink
//!                          └─ failures → Diagnostics
//! ```

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod handler;
pub mod message;
pub mod queue;
pub mod relay;
pub mod shutdown;
pub mod sink;
pub mod web;

// Re-export commonly used types
pub use config::Config;
pub use diagnostics::{CollectingDiagnostics, Diagnostics, TracingDiagnostics};
pub use error::{DecodeError, DeliveryError, HandleError, TransportError};
pub use handler::MessageHandler;
pub use message::{decode, transform, InboundMessage, OutboundPayload};
pub use queue::{callback, AmqpQueue, Callback, InMemoryQueue, MessageQueue};
pub use relay::bind;
pub use sink::{HttpSink, RecordingSink, Sink};
