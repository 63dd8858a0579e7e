//! Order status lifecycle.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// The fulfillment status of an order.
///
/// State transitions:
/// ```text
/// Pending ──┬──► Completed
///           └──► Failed ──► Completed
/// ```
/// `Completed` is never reverted. An order the store has never seen reports
/// `Pending`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum OrderStatus {
    /// Not yet fulfilled, or not known to the store.
    #[default]
    Pending,

    /// Fulfillment finished (terminal state).
    Completed { completed_at: DateTime<Utc> },

    /// The last fulfillment attempt failed.
    Failed {
        reason: String,
        failed_at: DateTime<Utc>,
    },
}

impl OrderStatus {
    /// Returns true only for [`OrderStatus::Completed`].
    pub fn is_completed(&self) -> bool {
        matches!(self, OrderStatus::Completed { .. })
    }

    /// Returns true for [`OrderStatus::Failed`].
    pub fn is_failed(&self) -> bool {
        matches!(self, OrderStatus::Failed { .. })
    }

    /// Returns the failure reason, if any.
    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            OrderStatus::Failed { reason, .. } => Some(reason),
            _ => None,
        }
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Completed { .. } => "completed",
            OrderStatus::Failed { .. } => "failed",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
