//! The order status table.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use common::OrderId;
use tokio::sync::RwLock;

use crate::status::OrderStatus;

/// Process-wide table of order id → fulfillment status.
///
/// Written by fulfillment workers, read by the reporting service. Writes are
/// serialized by a single lock, so every read observes the latest completed
/// write. Absence is not an error: unknown ids report [`OrderStatus::Pending`].
#[derive(Clone, Default)]
pub struct OrderStatusStore {
    statuses: Arc<RwLock<HashMap<OrderId, OrderStatus>>>,
}

impl OrderStatusStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks an order completed.
    ///
    /// Returns false if the order was already completed; the first
    /// completion time is kept.
    pub async fn set_completed(&self, order_id: OrderId) -> bool {
        let mut statuses = self.statuses.write().await;
        let status = statuses.entry(order_id).or_default();
        if status.is_completed() {
            return false;
        }
        *status = OrderStatus::Completed {
            completed_at: Utc::now(),
        };
        true
    }

    /// Records a failed fulfillment attempt.
    ///
    /// Returns false and leaves the status untouched if the order is already
    /// completed.
    pub async fn set_failed(&self, order_id: OrderId, reason: impl Into<String>) -> bool {
        let mut statuses = self.statuses.write().await;
        let status = statuses.entry(order_id).or_default();
        if status.is_completed() {
            return false;
        }
        *status = OrderStatus::Failed {
            reason: reason.into(),
            failed_at: Utc::now(),
        };
        true
    }

    /// Returns the status of an order.
    pub async fn get_status(&self, order_id: OrderId) -> OrderStatus {
        self.statuses
            .read()
            .await
            .get(&order_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Returns true if the order is completed.
    pub async fn is_completed(&self, order_id: OrderId) -> bool {
        self.get_status(order_id).await.is_completed()
    }

    /// Returns the number of orders with a recorded status.
    pub async fn len(&self) -> usize {
        self.statuses.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
