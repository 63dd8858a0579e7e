//! Shared types for the bakery system.
//!
//! - [`OrderId`] identifies an order across routing, fulfillment and reporting
//! - [`Order`] is the immutable unit of work submitted for fulfillment
//! - [`Destination`] is the closed set of fulfillment channels

pub mod destination;
pub mod order;
pub mod types;

pub use destination::Destination;
pub use order::{Order, OrderError};
pub use types::OrderId;
