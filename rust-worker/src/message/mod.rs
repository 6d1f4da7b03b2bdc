//! Message module: wire types and the payload transformation.
//!
//! ## Flow
//!
//! ```text
//! raw text → decode() → InboundMessage → transform() → OutboundPayload
//! ```

pub mod transform;
pub mod types;

pub use transform::{decode, transform};
pub use types::{EventData, InboundMessage, OutboundPayload, UserData};
