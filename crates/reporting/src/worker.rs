//! Fulfillment consumers.

use std::sync::Arc;

use channels::{ChannelReceiver, Destination, Envelope, InMemoryChannelSet};
use tokio::task::JoinHandle;

use crate::Result;
use crate::fulfiller::Fulfiller;
use crate::outbox::{FallbackOutbox, FallbackRelay};
use crate::store::OrderStatusStore;

/// Drains one fulfillment channel and records the outcome of every order.
///
/// The worker owns every status transition after routing: the router never
/// sees fulfillment side effects.
pub struct FulfillmentWorker<F: Fulfiller> {
    receiver: ChannelReceiver,
    fulfiller: Arc<F>,
    store: OrderStatusStore,
}

impl<F: Fulfiller> FulfillmentWorker<F> {
    /// Creates a worker over an already subscribed receiver.
    pub fn new(receiver: ChannelReceiver, fulfiller: Arc<F>, store: OrderStatusStore) -> Self {
        Self {
            receiver,
            fulfiller,
            store,
        }
    }

    /// Returns the destination this worker drains.
    pub fn destination(&self) -> Destination {
        self.receiver.destination()
    }

    /// Processes envelopes until the channel is closed and drained.
    ///
    /// Returns the number of envelopes handled.
    #[tracing::instrument(skip(self), fields(channel = %self.destination()))]
    pub async fn run(mut self) -> u64 {
        let mut handled = 0;
        while let Some(envelope) = self.receiver.recv().await {
            self.handle(envelope).await;
            handled += 1;
        }
        tracing::info!(handled, "channel drained, worker stopping");
        handled
    }

    async fn handle(&self, envelope: Envelope) {
        let order_id = envelope.order.id();
        let channel = envelope.channel_name();
        let started = std::time::Instant::now();

        match self.fulfiller.fulfill(&envelope.order).await {
            Ok(()) => {
                if self.store.set_completed(order_id).await {
                    metrics::counter!("orders_fulfilled_total", "channel" => channel)
                        .increment(1);
                    tracing::info!(%order_id, "order fulfilled");
                } else {
                    tracing::debug!(%order_id, "duplicate delivery ignored");
                }
            }
            Err(e) => {
                self.store.set_failed(order_id, e.to_string()).await;
                metrics::counter!("orders_fulfillment_failed_total").increment(1);
                tracing::warn!(%order_id, error = %e, "order fulfillment failed");
            }
        }

        metrics::histogram!("fulfillment_duration_seconds")
            .record(started.elapsed().as_secs_f64());
    }
}

/// One spawned worker per known-product channel.
///
/// The fallback channel is left for external consumers unless a relay is
/// attached with [`WorkerPool::spawn_fallback_relay`].
pub struct WorkerPool {
    handles: Vec<(Destination, JoinHandle<u64>)>,
}

impl WorkerPool {
    /// Subscribes to every worker channel and spawns a worker on each.
    pub async fn spawn<F: Fulfiller + 'static>(
        channels: &InMemoryChannelSet,
        store: OrderStatusStore,
        fulfiller: Arc<F>,
    ) -> Result<Self> {
        let mut handles = Vec::with_capacity(Destination::KNOWN.len());
        for destination in Destination::KNOWN {
            let receiver = channels.subscribe(destination).await?;
            let worker = FulfillmentWorker::new(receiver, fulfiller.clone(), store.clone());
            handles.push((destination, tokio::spawn(worker.run())));
        }
        tracing::info!(workers = handles.len(), "fulfillment workers started");
        Ok(Self { handles })
    }

    /// Drains the fallback channel into `outbox` as part of this pool.
    pub async fn spawn_fallback_relay(
        &mut self,
        channels: &InMemoryChannelSet,
        outbox: FallbackOutbox,
    ) -> Result<()> {
        let receiver = channels.subscribe(Destination::Unknown).await?;
        let relay = FallbackRelay::new(receiver, outbox);
        self.handles
            .push((Destination::Unknown, tokio::spawn(relay.run())));
        tracing::info!("fallback relay started");
        Ok(())
    }

    /// Returns the number of running workers.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Waits for every worker to finish and returns the total handled,
    /// relayed fallback envelopes included.
    ///
    /// Workers finish once their channels are closed and drained.
    pub async fn join(self) -> u64 {
        let (destinations, handles): (Vec<_>, Vec<_>) = self.handles.into_iter().unzip();
        let results = futures_util::future::join_all(handles).await;

        let mut total = 0;
        for (destination, result) in destinations.into_iter().zip(results) {
            match result {
                Ok(handled) => total += handled,
                Err(e) => tracing::error!(channel = %destination, error = %e, "worker panicked"),
            }
        }
        total
    }
}
