use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{RwLock, mpsc};

use crate::{
    ChannelError, Destination, Envelope, Result,
    set::{ChannelSet, EnvelopeStream},
};

/// Default number of envelopes a single queue holds before rejecting.
pub const DEFAULT_CAPACITY: usize = 1024;

struct Lane {
    sender: RwLock<Option<mpsc::Sender<Envelope>>>,
    receiver: RwLock<Option<mpsc::Receiver<Envelope>>>,
    capacity: usize,
    /// Envelopes accepted but not yet received; shared with the subscriber.
    queued: Arc<AtomicUsize>,
}

impl Lane {
    fn new(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity);
        Self {
            sender: RwLock::new(Some(tx)),
            receiver: RwLock::new(Some(rx)),
            capacity,
            queued: Arc::new(AtomicUsize::new(0)),
        }
    }
}

/// In-memory channel set backed by bounded tokio queues.
///
/// Cloning is cheap and every clone addresses the same queues.
#[derive(Clone)]
pub struct InMemoryChannelSet {
    lanes: Arc<HashMap<Destination, Lane>>,
}

impl InMemoryChannelSet {
    /// Creates a channel set with [`DEFAULT_CAPACITY`] per queue.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a channel set whose queues each hold `capacity` envelopes.
    ///
    /// A capacity of zero is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let lanes = Destination::all()
            .into_iter()
            .map(|d| (d, Lane::new(capacity)))
            .collect();
        Self {
            lanes: Arc::new(lanes),
        }
    }

    fn lane(&self, destination: Destination) -> &Lane {
        // every destination gets a lane in `with_capacity`
        &self.lanes[&destination]
    }

    /// Takes the receiving end of a queue.
    ///
    /// Each queue has exactly one subscriber; a second call fails with
    /// [`ChannelError::AlreadySubscribed`].
    pub async fn subscribe(&self, destination: Destination) -> Result<ChannelReceiver> {
        let lane = self.lane(destination);
        let receiver = lane
            .receiver
            .write()
            .await
            .take()
            .ok_or(ChannelError::AlreadySubscribed {
                channel: destination,
            })?;
        tracing::debug!(channel = %destination, "subscriber attached");
        Ok(ChannelReceiver {
            destination,
            inner: receiver,
            queued: Arc::clone(&lane.queued),
        })
    }

    /// Stops a queue from accepting envelopes.
    ///
    /// Envelopes already queued are still delivered; the subscriber sees the
    /// end of the channel once they are drained.
    pub async fn close(&self, destination: Destination) {
        self.lane(destination).sender.write().await.take();
        tracing::info!(channel = %destination, "channel closed");
    }

    /// Closes every queue.
    pub async fn close_all(&self) {
        for destination in Destination::all() {
            self.close(destination).await;
        }
    }

    /// Returns the number of envelopes waiting in a queue.
    ///
    /// A closed queue keeps reporting what is still left to drain.
    pub async fn depth(&self, destination: Destination) -> usize {
        self.lane(destination).queued.load(Ordering::SeqCst)
    }
}

impl Default for InMemoryChannelSet {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChannelSet for InMemoryChannelSet {
    async fn send(&self, envelope: Envelope) -> Result<()> {
        let destination = envelope.destination;
        let lane = self.lane(destination);
        let guard = lane.sender.read().await;
        let sender = guard.as_ref().ok_or(ChannelError::Closed {
            channel: destination,
        })?;

        // counted before the send so a fast receiver never sees zero
        lane.queued.fetch_add(1, Ordering::SeqCst);
        sender.try_send(envelope).map_err(|e| {
            lane.queued.fetch_sub(1, Ordering::SeqCst);
            match e {
                TrySendError::Full(_) => ChannelError::Full {
                    channel: destination,
                    capacity: lane.capacity,
                },
                TrySendError::Closed(_) => ChannelError::Closed {
                    channel: destination,
                },
            }
        })?;

        record_depth(destination, lane.queued.load(Ordering::SeqCst));
        Ok(())
    }

    async fn is_open(&self, destination: Destination) -> bool {
        self.lane(destination)
            .sender
            .read()
            .await
            .as_ref()
            .is_some_and(|s| !s.is_closed())
    }
}

fn record_depth(destination: Destination, depth: usize) {
    metrics::gauge!("channel_depth", "channel" => destination.channel_name()).set(depth as f64);
}

/// The receiving end of one fulfillment channel.
pub struct ChannelReceiver {
    destination: Destination,
    inner: mpsc::Receiver<Envelope>,
    queued: Arc<AtomicUsize>,
}

impl ChannelReceiver {
    /// Returns the destination this receiver drains.
    pub fn destination(&self) -> Destination {
        self.destination
    }

    /// Waits for the next envelope.
    ///
    /// Returns `None` once the channel is closed and drained.
    pub async fn recv(&mut self) -> Option<Envelope> {
        let envelope = self.inner.recv().await?;
        self.received();
        Some(envelope)
    }

    /// Returns the next envelope if one is already queued.
    pub fn try_recv(&mut self) -> Option<Envelope> {
        let envelope = self.inner.try_recv().ok()?;
        self.received();
        Some(envelope)
    }

    /// Converts the receiver into a stream of envelopes.
    pub fn into_stream(self) -> EnvelopeStream {
        use futures_util::stream;

        Box::pin(stream::unfold(self, |mut rx| async move {
            rx.recv().await.map(|envelope| (envelope, rx))
        }))
    }

    fn received(&self) {
        let left = self.queued.fetch_sub(1, Ordering::SeqCst).saturating_sub(1);
        record_depth(self.destination, left);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Order;

    fn envelope(destination: Destination, id: u64) -> Envelope {
        let order = Order::new(id, destination.as_str(), 1).unwrap();
        Envelope::new(destination, order)
    }

    #[tokio::test]
    async fn test_send_and_receive_in_fifo_order() {
        let channels = InMemoryChannelSet::new();
        let mut rx = channels.subscribe(Destination::Chocolate).await.unwrap();

        for id in 1..=3 {
            channels
                .send(envelope(Destination::Chocolate, id))
                .await
                .unwrap();
        }

        for id in 1..=3 {
            let received = rx.recv().await.unwrap();
            assert_eq!(received.order.id().as_u64(), id);
        }
        assert!(rx.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_queues_are_independent() {
        let channels = InMemoryChannelSet::new();
        let mut caramel = channels.subscribe(Destination::Caramel).await.unwrap();
        let mut blueberry = channels.subscribe(Destination::Blueberry).await.unwrap();

        channels
            .send(envelope(Destination::Caramel, 1))
            .await
            .unwrap();

        assert!(blueberry.try_recv().is_none());
        assert_eq!(
            caramel.try_recv().unwrap().destination,
            Destination::Caramel
        );
    }

    #[tokio::test]
    async fn test_second_subscribe_fails() {
        let channels = InMemoryChannelSet::new();
        let _rx = channels.subscribe(Destination::Unknown).await.unwrap();

        let err = channels.subscribe(Destination::Unknown).await.err().unwrap();
        assert_eq!(
            err,
            ChannelError::AlreadySubscribed {
                channel: Destination::Unknown
            }
        );
    }

    #[tokio::test]
    async fn test_closed_channel_rejects() {
        let channels = InMemoryChannelSet::new();
        channels.close(Destination::Blueberry).await;

        assert!(!channels.is_open(Destination::Blueberry).await);
        let err = channels
            .send(envelope(Destination::Blueberry, 1))
            .await
            .unwrap_err();
        assert_eq!(err.channel(), Destination::Blueberry);
        assert!(matches!(err, ChannelError::Closed { .. }));
    }

    #[tokio::test]
    async fn test_dropped_subscriber_closes_channel() {
        let channels = InMemoryChannelSet::new();
        let rx = channels.subscribe(Destination::Chocolate).await.unwrap();
        drop(rx);

        assert!(!channels.is_open(Destination::Chocolate).await);
        let result = channels.send(envelope(Destination::Chocolate, 1)).await;
        assert!(matches!(result, Err(ChannelError::Closed { .. })));
    }

    #[tokio::test]
    async fn test_full_channel_rejects_without_blocking() {
        let channels = InMemoryChannelSet::with_capacity(2);

        channels
            .send(envelope(Destination::Caramel, 1))
            .await
            .unwrap();
        channels
            .send(envelope(Destination::Caramel, 2))
            .await
            .unwrap();
        assert_eq!(channels.depth(Destination::Caramel).await, 2);

        let err = channels
            .send(envelope(Destination::Caramel, 3))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ChannelError::Full {
                channel: Destination::Caramel,
                capacity: 2
            }
        );
        assert_eq!(channels.depth(Destination::Caramel).await, 2);
    }

    #[tokio::test]
    async fn test_close_drains_queued_envelopes() {
        let channels = InMemoryChannelSet::new();
        let mut rx = channels.subscribe(Destination::Unknown).await.unwrap();

        channels
            .send(envelope(Destination::Unknown, 1))
            .await
            .unwrap();
        channels.close(Destination::Unknown).await;

        assert!(rx.recv().await.is_some());
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_depth_follows_receives() {
        let channels = InMemoryChannelSet::new();
        let mut rx = channels.subscribe(Destination::Chocolate).await.unwrap();
        for id in 1..=3 {
            channels
                .send(envelope(Destination::Chocolate, id))
                .await
                .unwrap();
        }
        assert_eq!(channels.depth(Destination::Chocolate).await, 3);

        rx.recv().await.unwrap();
        assert_eq!(channels.depth(Destination::Chocolate).await, 2);
        rx.try_recv().unwrap();
        assert_eq!(channels.depth(Destination::Chocolate).await, 1);
    }

    #[tokio::test]
    async fn test_closed_queue_reports_remaining_depth() {
        let channels = InMemoryChannelSet::new();
        let mut rx = channels.subscribe(Destination::Caramel).await.unwrap();
        for id in 1..=2 {
            channels
                .send(envelope(Destination::Caramel, id))
                .await
                .unwrap();
        }
        channels.close(Destination::Caramel).await;

        assert_eq!(channels.depth(Destination::Caramel).await, 2);
        rx.recv().await.unwrap();
        assert_eq!(channels.depth(Destination::Caramel).await, 1);
        rx.recv().await.unwrap();
        assert!(rx.recv().await.is_none());
        assert_eq!(channels.depth(Destination::Caramel).await, 0);
    }

    #[tokio::test]
    async fn test_rejected_send_is_not_counted() {
        let channels = InMemoryChannelSet::with_capacity(1);
        channels
            .send(envelope(Destination::Blueberry, 1))
            .await
            .unwrap();
        assert!(
            channels
                .send(envelope(Destination::Blueberry, 2))
                .await
                .is_err()
        );
        assert_eq!(channels.depth(Destination::Blueberry).await, 1);
    }

    #[tokio::test]
    async fn test_receiver_as_stream() {
        use futures_util::StreamExt;

        let channels = InMemoryChannelSet::new();
        let rx = channels.subscribe(Destination::Blueberry).await.unwrap();
        for id in 1..=2 {
            channels
                .send(envelope(Destination::Blueberry, id))
                .await
                .unwrap();
        }
        channels.close(Destination::Blueberry).await;

        let ids: Vec<u64> = rx
            .into_stream()
            .map(|e| e.order.id().as_u64())
            .collect()
            .await;
        assert_eq!(ids, vec![1, 2]);
    }
}
