//! Reporting query surface.

use async_trait::async_trait;
use common::OrderId;
use serde::Serialize;

use crate::status::OrderStatus;
use crate::store::OrderStatusStore;

/// Reply to a reporting status query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    /// True once the order is completed.
    pub status: bool,
}

/// Anything a polling client can ask for an order's status.
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Returns the current status of an order.
    async fn order_status(&self, order_id: OrderId) -> OrderStatus;
}

/// Read-only view over the [`OrderStatusStore`].
///
/// Performs no mutation and no caching: every query reflects the store's
/// current value.
#[derive(Clone)]
pub struct ReportingService {
    store: OrderStatusStore,
}

impl ReportingService {
    /// Creates a reporting service over the given store.
    pub fn new(store: OrderStatusStore) -> Self {
        Self { store }
    }

    /// Answers `status(orderId)`.
    #[tracing::instrument(skip(self))]
    pub async fn status(&self, order_id: OrderId) -> StatusReport {
        StatusReport {
            status: self.store.is_completed(order_id).await,
        }
    }

    /// Returns the full status record of an order.
    pub async fn detail(&self, order_id: OrderId) -> OrderStatus {
        self.store.get_status(order_id).await
    }
}

#[async_trait]
impl StatusSource for ReportingService {
    async fn order_status(&self, order_id: OrderId) -> OrderStatus {
        self.detail(order_id).await
    }
}
