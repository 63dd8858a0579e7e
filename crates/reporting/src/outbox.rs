//! Holding area for orders no bakery line accepts.

use std::collections::VecDeque;
use std::sync::Arc;

use channels::{ChannelReceiver, Envelope};
use tokio::sync::Mutex;

/// Default number of envelopes the outbox retains.
pub const DEFAULT_OUTBOX_CAPACITY: usize = 1024;

/// Bounded buffer of fallback envelopes waiting for an external worker.
///
/// When full, the oldest envelope is dropped so the fallback channel keeps
/// draining and routing never backs up on unclaimed orders.
#[derive(Clone)]
pub struct FallbackOutbox {
    entries: Arc<Mutex<VecDeque<Envelope>>>,
    capacity: usize,
}

impl FallbackOutbox {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_OUTBOX_CAPACITY)
    }

    /// Creates an outbox holding at most `capacity` envelopes (minimum one).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Appends an envelope, evicting the oldest one when full.
    pub async fn push(&self, envelope: Envelope) {
        let mut entries = self.entries.lock().await;
        if entries.len() == self.capacity
            && let Some(dropped) = entries.pop_front()
        {
            metrics::counter!("fallback_outbox_dropped_total").increment(1);
            tracing::warn!(
                order_id = %dropped.order.id(),
                envelope_id = %dropped.envelope_id,
                "fallback outbox full, dropping oldest envelope"
            );
        }
        entries.push_back(envelope);
        metrics::gauge!("fallback_outbox_len").set(entries.len() as f64);
    }

    /// Removes and returns up to `limit` envelopes in arrival order.
    pub async fn take(&self, limit: usize) -> Vec<Envelope> {
        let mut entries = self.entries.lock().await;
        let n = limit.min(entries.len());
        let taken: Vec<_> = entries.drain(..n).collect();
        metrics::gauge!("fallback_outbox_len").set(entries.len() as f64);
        taken
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

impl Default for FallbackOutbox {
    fn default() -> Self {
        Self::new()
    }
}

/// Moves every envelope from the fallback channel into an outbox.
pub struct FallbackRelay {
    receiver: ChannelReceiver,
    outbox: FallbackOutbox,
}

impl FallbackRelay {
    pub fn new(receiver: ChannelReceiver, outbox: FallbackOutbox) -> Self {
        Self { receiver, outbox }
    }

    /// Relays envelopes until the channel is closed and drained.
    ///
    /// Returns the number of envelopes relayed.
    #[tracing::instrument(skip(self), fields(channel = %self.receiver.destination()))]
    pub async fn run(mut self) -> u64 {
        let mut relayed = 0;
        while let Some(envelope) = self.receiver.recv().await {
            tracing::debug!(order_id = %envelope.order.id(), "unclaimed order parked");
            self.outbox.push(envelope).await;
            relayed += 1;
        }
        tracing::info!(relayed, "fallback channel drained, relay stopping");
        relayed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use channels::{ChannelSet, Destination, InMemoryChannelSet};
    use common::{Order, OrderId};

    fn envelope(id: u64) -> Envelope {
        let order = Order::new(id, "brownie", 1).unwrap();
        Envelope::new(order.destination(), order)
    }

    #[tokio::test]
    async fn test_take_returns_arrival_order() {
        let outbox = FallbackOutbox::new();
        for id in 1..=3 {
            outbox.push(envelope(id)).await;
        }

        let first: Vec<_> = outbox.take(2).await.iter().map(|e| e.order.id()).collect();
        assert_eq!(first, vec![OrderId::new(1), OrderId::new(2)]);
        assert_eq!(outbox.len().await, 1);
        assert_eq!(outbox.take(10).await.len(), 1);
        assert!(outbox.is_empty().await);
    }

    #[tokio::test]
    async fn test_full_outbox_drops_oldest() {
        let outbox = FallbackOutbox::with_capacity(2);
        for id in 1..=3 {
            outbox.push(envelope(id)).await;
        }

        let ids: Vec<_> = outbox.take(10).await.iter().map(|e| e.order.id()).collect();
        assert_eq!(ids, vec![OrderId::new(2), OrderId::new(3)]);
    }

    #[tokio::test]
    async fn test_relay_keeps_fallback_channel_draining() {
        let channels = InMemoryChannelSet::with_capacity(2);
        let outbox = FallbackOutbox::with_capacity(16);
        let receiver = channels.subscribe(Destination::Unknown).await.unwrap();
        let relay = tokio::spawn(FallbackRelay::new(receiver, outbox.clone()).run());

        for id in 1..=6 {
            channels.send(envelope(id)).await.unwrap();
            tokio::task::yield_now().await;
            while channels.depth(Destination::Unknown).await > 0 {
                tokio::task::yield_now().await;
            }
        }
        channels.close(Destination::Unknown).await;

        assert_eq!(relay.await.unwrap(), 6);
        assert_eq!(outbox.len().await, 6);
    }
}
