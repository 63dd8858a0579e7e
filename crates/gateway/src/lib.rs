//! Transactional gateway between application code and a backing store.
//!
//! Every logical write runs in a [`TransactionSession`] that enforces the
//! protocol:
//! 1. `startTransaction`
//! 2. one or more `execute(sql)`
//! 3. exactly one of `commitTransaction` or `rollbackTransaction`
//!
//! With auto-transaction handling enabled on the [`TransactionalGateway`],
//! a lone `execute` is wrapped in begin/commit (or begin/rollback) for the
//! caller.

pub mod backend;
pub mod error;
pub mod gateway;
pub mod messages;
pub mod registry;
pub mod session;
pub mod state;
pub mod statement;

pub use backend::{Backend, InMemoryBackend};
pub use error::{BackendError, GatewayError, Result, StatementFailure};
pub use gateway::{AutoTransactionGuard, GatewayConfig, TransactionalGateway};
pub use messages::{GatewayReply, GatewayRequest, Operation};
pub use registry::{SessionRegistry, SharedSession};
pub use session::{SessionId, TransactionMode, TransactionSession};
pub use state::SessionState;
pub use statement::{Statement, StatementPredicate, StatementRecord, StatementResult};
