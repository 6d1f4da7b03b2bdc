//! Message types for both sides of the relay.
//!
//! This module defines the formats for:
//! - the inbound queue message, as published by producers
//! - the outbound payload, as delivered to the sink

use serde::{Deserialize, Serialize};

// =============================================================================
// Inbound (queue side)
// =============================================================================

/// A message as it arrives on the queue.
///
/// Every field is required. Unknown extra fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Producer-assigned identifier
    pub id: String,
    /// ISO-8601-like timestamp, passed through verbatim
    pub timestamp: String,
    /// Event envelope
    pub data: EventData,
}

/// The `data` wrapper of an inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventData {
    /// Free-form event type tag
    #[serde(rename = "type")]
    pub event_type: String,
    /// User action details
    pub details: UserData,
}

/// User action details. Shared verbatim between inbound and outbound forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub action: String,
    pub user_id: String,
}

// =============================================================================
// Outbound (sink side)
// =============================================================================

/// Payload delivered to the sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundPayload {
    pub event_id: String,
    pub event_type: String,
    pub event_timestamp: String,
    pub user_data: UserData,
}
