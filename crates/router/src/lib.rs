//! Content-based routing of bakery orders.
//!
//! This crate provides:
//! - [`RoutingDecision`], the pure mapping from product type to channel
//! - [`Router`], which enqueues an order on its channel and acknowledges
//!   the submitter without waiting for fulfillment

pub mod decision;
pub mod error;
pub mod router;

pub use decision::RoutingDecision;
pub use error::RouterError;
pub use router::{Acknowledgement, Router};
