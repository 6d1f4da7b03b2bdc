//! Decoding and reshaping of queue messages.

use crate::error::DecodeError;

use super::types::{InboundMessage, OutboundPayload};

/// Decode raw queue text into an `InboundMessage`.
///
/// Fails on malformed JSON as well as on well-formed JSON that lacks a
/// required field or has one of the wrong type.
pub fn decode(raw: &str) -> Result<InboundMessage, DecodeError> {
    Ok(serde_json::from_str(raw)?)
}

/// Project an inbound message onto the delivery shape.
///
/// Pure and total: fields are copied and renamed, the `data` wrapper is
/// flattened away, nothing is computed.
pub fn transform(message: &InboundMessage) -> OutboundPayload {
    OutboundPayload {
        event_id: message.id.clone(),
        event_type: message.data.event_type.clone(),
        event_timestamp: message.timestamp.clone(),
        user_data: message.data.details.clone(),
    }
}

impl From<InboundMessage> for OutboundPayload {
    fn from(message: InboundMessage) -> Self {
        OutboundPayload {
            event_id: message.id,
            event_type: message.data.event_type,
            event_timestamp: message.timestamp,
            user_data: message.data.details,
        }
    }
}
