//! Transaction session state machine.

use serde::{Deserialize, Serialize};

/// The state of a transaction session.
///
/// State transitions:
/// ```text
/// Idle ──begin──► Started ──┬──commit───► Committed
///                   │  ▲    └──rollback─► RolledBack
///                   └──┘ execute
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SessionState {
    /// No transaction has been started.
    #[default]
    Idle,

    /// A transaction is open and accepts statements.
    Started,

    /// The transaction was committed (terminal state).
    Committed,

    /// The transaction was rolled back (terminal state).
    RolledBack,
}

impl SessionState {
    /// Returns true if a transaction can begin.
    pub fn can_begin(&self) -> bool {
        matches!(self, SessionState::Idle)
    }

    /// Returns true if statements can be recorded.
    pub fn can_execute(&self) -> bool {
        matches!(self, SessionState::Started)
    }

    /// Returns true if the transaction can be committed or rolled back.
    pub fn can_finish(&self) -> bool {
        matches!(self, SessionState::Started)
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Committed | SessionState::RolledBack)
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "Idle",
            SessionState::Started => "Started",
            SessionState::Committed => "Committed",
            SessionState::RolledBack => "RolledBack",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
