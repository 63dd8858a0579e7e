use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{Destination, Order};

/// Unique identifier for a delivered envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EnvelopeId(Uuid);

impl EnvelopeId {
    /// Creates a new random envelope ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for EnvelopeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EnvelopeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An order in transit on a fulfillment channel.
///
/// Carries the order itself for in-process consumers and its rendered
/// XML payload for external workers.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    /// Unique identifier for this delivery.
    pub envelope_id: EnvelopeId,

    /// The channel the envelope is addressed to.
    pub destination: Destination,

    /// The order being delivered.
    pub order: Order,

    /// Wire representation of the order.
    pub payload: String,

    /// When the envelope was handed to the channel set.
    pub enqueued_at: DateTime<Utc>,
}

impl Envelope {
    /// Wraps an order for delivery to the given destination.
    pub fn new(destination: Destination, order: Order) -> Self {
        let payload = order.to_xml();
        Self {
            envelope_id: EnvelopeId::new(),
            destination,
            order,
            payload,
            enqueued_at: Utc::now(),
        }
    }

    /// Returns the channel identifier of the destination.
    pub fn channel_name(&self) -> &'static str {
        self.destination.channel_name()
    }
}
