//! Recording sink - keeps every delivery in memory.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::DeliveryError;
use crate::message::OutboundPayload;

use super::Sink;

/// One recorded delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkCall {
    pub endpoint: String,
    pub payload: OutboundPayload,
}

/// A sink that records calls and can be switched into failure mode.
#[derive(Debug, Default)]
pub struct RecordingSink {
    calls: Mutex<Vec<SinkCall>>,
    fail: AtomicBool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that rejects every delivery until `set_fail(false)`.
    pub fn failing() -> Self {
        let sink = Self::default();
        sink.set_fail(true);
        sink
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Successful deliveries in the order they were accepted.
    pub fn calls(&self) -> Vec<SinkCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Event ids of the accepted deliveries, in order.
    pub fn event_ids(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .map(|c| c.payload.event_id)
            .collect()
    }
}

#[async_trait]
impl Sink for RecordingSink {
    async fn deliver(&self, endpoint: &str, payload: &OutboundPayload) -> Result<(), DeliveryError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DeliveryError::Rejected(format!(
                "recording sink refused delivery to {endpoint}"
            )));
        }

        let mut calls = self
            .calls
            .lock()
            .map_err(|_| DeliveryError::Rejected("recording sink poisoned".to_string()))?;
        calls.push(SinkCall {
            endpoint: endpoint.to_string(),
            payload: payload.clone(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::UserData;

    fn payload(id: &str) -> OutboundPayload {
        OutboundPayload {
            event_id: id.to_string(),
            event_type: "user_action".to_string(),
            event_timestamp: "t".to_string(),
            user_data: UserData {
                action: "login".to_string(),
                user_id: "u".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_records_calls_in_order() {
        let sink = RecordingSink::new();
        sink.deliver("/a", &payload("1")).await.unwrap();
        sink.deliver("/b", &payload("2")).await.unwrap();

        let calls = sink.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].endpoint, "/a");
        assert_eq!(sink.event_ids(), vec!["1", "2"]);
    }

    #[tokio::test]
    async fn test_failing_sink_records_nothing() {
        let sink = RecordingSink::failing();
        assert!(sink.deliver("/a", &payload("1")).await.is_err());
        assert!(sink.calls().is_empty());

        sink.set_fail(false);
        assert!(sink.deliver("/a", &payload("2")).await.is_ok());
        assert_eq!(sink.event_ids(), vec!["2"]);
    }
}
