//! Reporting error types.

use common::OrderId;
use thiserror::Error;

/// Errors surfaced by fulfillment and the status polling workflow.
#[derive(Debug, Error)]
pub enum ReportingError {
    /// The polling budget ran out before the order completed.
    #[error("Order {order_id} not fulfilled after {attempts} status checks")]
    FulfillmentTimeout { order_id: OrderId, attempts: u32 },

    /// Fulfillment reported a failure for the order.
    #[error("Order {order_id} fulfillment failed: {reason}")]
    FulfillmentFailed { order_id: OrderId, reason: String },

    /// The bakery could not fulfill an order.
    #[error("Bakery error: {0}")]
    Bakery(String),

    /// A worker could not attach to its channel.
    #[error("Channel error: {0}")]
    Channel(#[from] channels::ChannelError),
}

/// Result type for reporting operations.
pub type Result<T> = std::result::Result<T, ReportingError>;
