//! Gateway message vocabulary.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Protocol operations, named as they appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    StartTransaction,
    Execute,
    CommitTransaction,
    RollbackTransaction,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::StartTransaction => "startTransaction",
            Operation::Execute => "execute",
            Operation::CommitTransaction => "commitTransaction",
            Operation::RollbackTransaction => "rollbackTransaction",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request sent to a gateway session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase")]
pub enum GatewayRequest {
    StartTransaction,
    Execute {
        sql: String,
        #[serde(default)]
        params: Vec<Value>,
    },
    CommitTransaction,
    RollbackTransaction,
}

impl GatewayRequest {
    pub fn operation(&self) -> Operation {
        match self {
            GatewayRequest::StartTransaction => Operation::StartTransaction,
            GatewayRequest::Execute { .. } => Operation::Execute,
            GatewayRequest::CommitTransaction => Operation::CommitTransaction,
            GatewayRequest::RollbackTransaction => Operation::RollbackTransaction,
        }
    }
}

/// The gateway's answer to a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum GatewayReply {
    Success {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rows_updated: Option<u64>,
    },
    Error {
        reason: String,
    },
}

impl GatewayReply {
    /// `success()` without a row count.
    pub fn success() -> Self {
        GatewayReply::Success { rows_updated: None }
    }

    /// `success().rowsUpdated(n)`.
    pub fn rows_updated(rows: u64) -> Self {
        GatewayReply::Success {
            rows_updated: Some(rows),
        }
    }

    pub fn error(reason: impl Into<String>) -> Self {
        GatewayReply::Error {
            reason: reason.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, GatewayReply::Success { .. })
    }
}
