//! Status propagation for routed orders.
//!
//! This crate provides the asynchronous half of the bakery:
//! - [`OrderStatusStore`], the process-wide order-id → status table
//! - [`FulfillmentWorker`] and [`WorkerPool`], consumers that drain worker
//!   channels and record completion
//! - [`FallbackOutbox`] and [`FallbackRelay`], which park orders no bakery
//!   line accepts until an external worker collects them
//! - [`ReportingService`], the read-only query surface over the store
//! - [`StatusPoller`], the bounded polling client every caller of the
//!   reporting service follows

pub mod error;
pub mod fulfiller;
pub mod outbox;
pub mod poller;
pub mod service;
pub mod status;
pub mod store;
pub mod worker;

pub use error::{ReportingError, Result};
pub use fulfiller::{Fulfiller, SimulatedBakery};
pub use outbox::{DEFAULT_OUTBOX_CAPACITY, FallbackOutbox, FallbackRelay};
pub use poller::{PollPolicy, StatusPoller};
pub use service::{ReportingService, StatusReport, StatusSource};
pub use status::OrderStatus;
pub use store::OrderStatusStore;
pub use worker::{FulfillmentWorker, WorkerPool};
