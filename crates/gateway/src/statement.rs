//! Statements, expected-shape predicates and the per-session statement log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StatementFailure;

/// A SQL statement with positional parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub sql: String,
    #[serde(default)]
    pub params: Vec<Value>,
}

impl Statement {
    /// Creates a statement without parameters.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Appends a positional parameter.
    pub fn bind(mut self, value: impl Into<Value>) -> Self {
        self.params.push(value.into());
        self
    }
}

/// The shape a statement must have for the gateway to accept it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "match", content = "value", rename_all = "snake_case")]
pub enum StatementPredicate {
    /// Any statement is accepted.
    #[default]
    Any,

    /// The SQL must start with the given prefix (leading whitespace ignored).
    StartsWith(String),

    /// The SQL must equal the given text (surrounding whitespace ignored).
    Exact(String),
}

impl StatementPredicate {
    pub fn starts_with(prefix: impl Into<String>) -> Self {
        StatementPredicate::StartsWith(prefix.into())
    }

    /// Returns true if the statement has the expected shape.
    pub fn matches(&self, statement: &Statement) -> bool {
        let sql = statement.sql.trim();
        match self {
            StatementPredicate::Any => true,
            StatementPredicate::StartsWith(prefix) => sql.starts_with(prefix.as_str()),
            StatementPredicate::Exact(text) => sql == text.trim(),
        }
    }

    /// Human-readable description used in failure reasons and the log.
    pub fn describe(&self) -> String {
        match self {
            StatementPredicate::Any => "any statement".to_string(),
            StatementPredicate::StartsWith(prefix) => format!("startsWith('{prefix}')"),
            StatementPredicate::Exact(text) => format!("equals('{text}')"),
        }
    }
}

/// Outcome of one executed statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum StatementResult {
    Success { rows_updated: u64 },
    Failure { reason: StatementFailure },
}

impl StatementResult {
    pub fn is_success(&self) -> bool {
        matches!(self, StatementResult::Success { .. })
    }

    /// Returns the affected row count of a successful statement.
    pub fn rows_updated(&self) -> Option<u64> {
        match self {
            StatementResult::Success { rows_updated } => Some(*rows_updated),
            StatementResult::Failure { .. } => None,
        }
    }

    pub fn failure(&self) -> Option<&StatementFailure> {
        match self {
            StatementResult::Failure { reason } => Some(reason),
            StatementResult::Success { .. } => None,
        }
    }
}

/// An entry in a session's statement log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatementRecord {
    pub statement: Statement,
    /// Description of the predicate the statement was checked against.
    pub predicate: String,
    pub result: StatementResult,
    pub executed_at: DateTime<Utc>,
}
