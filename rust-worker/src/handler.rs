//! Message handling - decode, transform, deliver.
//!
//! The handler owns the failure policy of the relay: whatever goes wrong with
//! one message is reported through the diagnostics channel exactly once and
//! never reaches the caller.

use std::sync::Arc;

use tracing::{debug, info};

use crate::diagnostics::{Diagnostics, TracingDiagnostics};
use crate::error::HandleError;
use crate::message::{decode, transform};
use crate::sink::Sink;

/// Relays single raw messages to a fixed sink endpoint.
#[derive(Clone)]
pub struct MessageHandler {
    sink: Arc<dyn Sink>,
    endpoint: String,
    diagnostics: Arc<dyn Diagnostics>,
}

impl MessageHandler {
    /// Create a handler delivering to `endpoint`, reporting failures as
    /// tracing events.
    pub fn new(sink: Arc<dyn Sink>, endpoint: impl Into<String>) -> Self {
        Self::with_diagnostics(sink, endpoint, Arc::new(TracingDiagnostics))
    }

    /// Create a handler with an explicit diagnostics channel.
    pub fn with_diagnostics(
        sink: Arc<dyn Sink>,
        endpoint: impl Into<String>,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Self {
        Self {
            sink,
            endpoint: endpoint.into(),
            diagnostics,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Handle one raw message. Never fails from the caller's point of view.
    pub async fn handle(&self, raw: &str) {
        if let Err(failure) = self.try_handle(raw).await {
            self.diagnostics.report(raw, &failure);
        }
    }

    /// Decode, transform and deliver `raw`, returning the first failure.
    pub async fn try_handle(&self, raw: &str) -> Result<(), HandleError> {
        debug!(body_length = raw.len(), "relay_message_received");

        let message = decode(raw)?;
        let payload = transform(&message);

        self.sink.deliver(&self.endpoint, &payload).await?;

        info!(
            event_id = %payload.event_id,
            event_type = %payload.event_type,
            endpoint = %self.endpoint,
            "relay_message_delivered"
        );

        Ok(())
    }
}
