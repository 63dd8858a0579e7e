//! Router error types.

use channels::ChannelError;
use common::{Destination, OrderError};
use thiserror::Error;

/// Errors that can occur while routing an order.
#[derive(Debug, Error)]
pub enum RouterError {
    /// The destination channel did not accept the order; nothing was enqueued.
    #[error("Routing unavailable for {channel}: {source}")]
    RoutingUnavailable {
        channel: Destination,
        #[source]
        source: ChannelError,
    },

    /// The submitted order failed validation.
    #[error("Invalid order: {0}")]
    InvalidOrder(#[from] OrderError),
}
