//! Gateway error types.

use serde::Serialize;
use thiserror::Error;

use crate::messages::Operation;
use crate::state::SessionState;

/// Error reported by a backing store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct BackendError(pub String);

impl BackendError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Why a single statement failed.
///
/// Statement failures are results, not errors: the session stays open and
/// the caller is expected to roll back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StatementFailure {
    /// The statement does not have the shape the gateway expects.
    #[error("Statement does not match {expected}: {statement}")]
    StatementMismatch { statement: String, expected: String },

    /// The backing store refused the statement.
    #[error("{reason}")]
    Rejected { reason: String },
}

/// Errors raised by the transaction protocol.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The operation is not allowed in the session's current state.
    /// Fatal to the session, which is rolled back.
    #[error("Protocol violation: cannot {operation} in {state} session ({reason})")]
    ProtocolViolation {
        operation: Operation,
        state: SessionState,
        reason: &'static str,
    },

    /// The session already reached a terminal state.
    #[error("Session closed: cannot {operation} after {state}")]
    SessionClosed {
        operation: Operation,
        state: SessionState,
    },

    /// The backing store failed to begin, commit or roll back.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;
