//! The content-based router.

use channels::{ChannelSet, Envelope};
use common::{Order, OrderId};

use crate::decision::RoutingDecision;
use crate::error::RouterError;

/// Acknowledgement returned to the submitter.
///
/// Carries no information about eventual fulfillment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acknowledgement {
    /// The order was handed to its channel.
    NoContent,
}

/// Routes orders onto fulfillment channels by product type.
///
/// `route` returns as soon as the destination channel has accepted the
/// order. Fulfillment happens later, on whichever consumer drains that
/// channel.
#[derive(Clone)]
pub struct Router<C: ChannelSet> {
    channels: C,
}

impl<C: ChannelSet> Router<C> {
    /// Creates a router over the given channel set.
    pub fn new(channels: C) -> Self {
        Self { channels }
    }

    /// Returns a reference to the underlying channel set.
    pub fn channels(&self) -> &C {
        &self.channels
    }

    /// Classifies an order and enqueues it on exactly one channel.
    #[tracing::instrument(
        skip(self, order),
        fields(order_id = %order.id(), product_type = order.product_type())
    )]
    pub async fn route(&self, order: Order) -> Result<Acknowledgement, RouterError> {
        let decision = RoutingDecision::for_order(&order);
        let channel = decision.channel_name();
        let envelope = Envelope::new(decision.destination(), order);

        match self.channels.send(envelope).await {
            Ok(()) => {
                metrics::counter!("orders_routed_total", "channel" => channel).increment(1);
                tracing::info!(channel, fallback = decision.is_fallback(), "order routed");
                Ok(Acknowledgement::NoContent)
            }
            Err(source) => {
                metrics::counter!("orders_routing_failed_total", "channel" => channel)
                    .increment(1);
                tracing::warn!(channel, error = %source, "routing unavailable");
                Err(RouterError::RoutingUnavailable {
                    channel: decision.destination(),
                    source,
                })
            }
        }
    }

    /// Validates the raw fields of a submission and routes the resulting order.
    pub async fn submit(
        &self,
        id: OrderId,
        product_type: &str,
        amount: u32,
    ) -> Result<Acknowledgement, RouterError> {
        let order = Order::new(id, product_type, amount)?;
        self.route(order).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use channels::{ChannelError, Destination, InMemoryChannelSet};

    #[tokio::test]
    async fn test_route_known_type() {
        let channels = InMemoryChannelSet::new();
        let mut rx = channels.subscribe(Destination::Chocolate).await.unwrap();
        let router = Router::new(channels);

        let ack = router
            .route(Order::new(7u64, "chocolate", 1).unwrap())
            .await
            .unwrap();

        assert_eq!(ack, Acknowledgement::NoContent);
        let envelope = rx.try_recv().unwrap();
        assert_eq!(envelope.order.id(), OrderId::new(7));
        assert_eq!(envelope.channel_name(), "worker.chocolate.inbound");
    }

    #[tokio::test]
    async fn test_route_to_closed_channel_is_unavailable() {
        let channels = InMemoryChannelSet::new();
        channels.close(Destination::Caramel).await;
        let router = Router::new(channels.clone());

        let err = router
            .route(Order::new(1u64, "caramel", 1).unwrap())
            .await
            .unwrap_err();

        match err {
            RouterError::RoutingUnavailable { channel, source } => {
                assert_eq!(channel, Destination::Caramel);
                assert!(matches!(source, ChannelError::Closed { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(channels.depth(Destination::Caramel).await, 0);
    }

    #[tokio::test]
    async fn test_submit_rejects_invalid_amount() {
        let channels = InMemoryChannelSet::new();
        let router = Router::new(channels.clone());

        let err = router
            .submit(OrderId::new(3), "blueberry", 0)
            .await
            .unwrap_err();

        assert!(matches!(err, RouterError::InvalidOrder(_)));
        assert_eq!(channels.depth(Destination::Blueberry).await, 0);
    }
}
