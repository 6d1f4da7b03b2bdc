//! Web server module for HTTP ingest.
//!
//! This module provides a thin web tier that:
//! - Accepts raw message bodies over HTTP
//! - Publishes them verbatim to the named queue
//! - Returns as soon as the queue has accepted them
//!
//! Bodies are not parsed here; validation belongs to the relay handler.

pub mod handlers;

pub use handlers::{health, publish_message, router, AppState, HealthResponse, PublishResponse};
