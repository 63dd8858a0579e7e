//! Named asynchronous channels between the router and fulfillment consumers.
//!
//! One bounded queue exists per [`Destination`]. Producers hand an
//! [`Envelope`] to a [`ChannelSet`]; each queue has a single subscriber that
//! receives envelopes in FIFO order.

pub mod envelope;
pub mod error;
pub mod memory;
pub mod set;

pub use common::{Destination, Order, OrderId};
pub use envelope::{Envelope, EnvelopeId};
pub use error::{ChannelError, Result};
pub use memory::{ChannelReceiver, DEFAULT_CAPACITY, InMemoryChannelSet};
pub use set::{ChannelSet, EnvelopeStream};
