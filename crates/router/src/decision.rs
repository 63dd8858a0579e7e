//! Routing decisions.

use common::{Destination, Order};

/// Where an order goes.
///
/// Derived from the product type alone, never stored. The mapping is total
/// (every type has exactly one destination) and pure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoutingDecision {
    destination: Destination,
}

impl RoutingDecision {
    /// Classifies an order by its product type.
    pub fn for_order(order: &Order) -> Self {
        Self::for_type(order.product_type())
    }

    /// Classifies a raw product type.
    pub fn for_type(product_type: &str) -> Self {
        Self {
            destination: Destination::for_type(product_type),
        }
    }

    pub fn destination(&self) -> Destination {
        self.destination
    }

    pub fn channel_name(&self) -> &'static str {
        self.destination.channel_name()
    }

    /// Returns true if the order falls through to the fallback channel.
    pub fn is_fallback(&self) -> bool {
        self.destination.is_fallback()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_types_get_dedicated_channels() {
        for (t, channel) in [
            ("chocolate", "worker.chocolate.inbound"),
            ("caramel", "worker.caramel.inbound"),
            ("blueberry", "worker.blueberry.inbound"),
        ] {
            let decision = RoutingDecision::for_type(t);
            assert_eq!(decision.channel_name(), channel);
            assert!(!decision.is_fallback());
        }
    }

    #[test]
    fn other_types_fall_back() {
        let decision = RoutingDecision::for_type("brownie");
        assert_eq!(decision.destination(), Destination::Unknown);
        assert_eq!(decision.channel_name(), "factory.unknown.inbound");
        assert!(decision.is_fallback());
    }

    #[test]
    fn order_decision_matches_type_decision() {
        let order = Order::new(1u64, "Caramel", 2).unwrap();
        assert_eq!(
            RoutingDecision::for_order(&order),
            RoutingDecision::for_type("caramel")
        );
    }
}
