use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;

use crate::{Destination, Envelope, Result};

/// A stream of envelopes from one channel.
pub type EnvelopeStream = Pin<Box<dyn Stream<Item = Envelope> + Send>>;

/// Core trait for fulfillment channel sets.
///
/// A channel set owns one queue per [`Destination`]. Implementations must be
/// safe under concurrent producers; queues are independent of each other.
#[async_trait]
pub trait ChannelSet: Send + Sync {
    /// Hands an envelope to the queue named by `envelope.destination`.
    ///
    /// Either the envelope is accepted by exactly that queue or an error is
    /// returned and nothing was enqueued. Never waits for a consumer.
    async fn send(&self, envelope: Envelope) -> Result<()>;

    /// Returns true if the destination currently accepts envelopes.
    async fn is_open(&self, destination: Destination) -> bool;
}
