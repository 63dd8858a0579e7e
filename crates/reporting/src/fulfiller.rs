//! Fulfillment trait and the simulated bakery.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::{Order, OrderId};
use tokio::sync::Mutex;

use crate::error::ReportingError;

/// Performs the work behind an order.
#[async_trait]
pub trait Fulfiller: Send + Sync {
    /// Fulfills a single order.
    async fn fulfill(&self, order: &Order) -> Result<(), ReportingError>;
}

#[derive(Debug, Default)]
struct BakeryState {
    baked: Vec<OrderId>,
    failing_types: HashSet<String>,
}

/// In-memory bakery that "bakes" after a fixed delay.
#[derive(Debug, Clone, Default)]
pub struct SimulatedBakery {
    delay: Duration,
    state: Arc<Mutex<BakeryState>>,
}

impl SimulatedBakery {
    /// Creates a bakery that finishes every order immediately.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a bakery that spends `delay` on every order.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    /// Configures the bakery to fail every order of the given product type.
    pub async fn fail_on_type(&self, product_type: &str) {
        self.state
            .lock()
            .await
            .failing_types
            .insert(product_type.trim().to_ascii_lowercase());
    }

    /// Returns the ids of baked orders in completion order.
    pub async fn baked(&self) -> Vec<OrderId> {
        self.state.lock().await.baked.clone()
    }
}

#[async_trait]
impl Fulfiller for SimulatedBakery {
    async fn fulfill(&self, order: &Order) -> Result<(), ReportingError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let mut state = self.state.lock().await;
        if state
            .failing_types
            .contains(&order.product_type().to_ascii_lowercase())
        {
            return Err(ReportingError::Bakery(format!(
                "cannot bake {}",
                order.product_type()
            )));
        }
        state.baked.push(order.id());
        Ok(())
    }
}
