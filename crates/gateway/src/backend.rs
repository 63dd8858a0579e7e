//! Backing store trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::BackendError;
use crate::session::SessionId;
use crate::statement::Statement;

/// A transactional store the gateway writes through.
///
/// Every call is keyed by the session that owns the transaction, so one
/// backend serves any number of independent sessions.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Opens a transaction for the session.
    async fn begin(&self, session: SessionId) -> Result<(), BackendError>;

    /// Executes a statement inside the session's transaction and returns
    /// the number of rows it affected.
    async fn execute(&self, session: SessionId, statement: &Statement)
    -> Result<u64, BackendError>;

    /// Makes the session's staged statements durable.
    async fn commit(&self, session: SessionId) -> Result<(), BackendError>;

    /// Discards the session's staged statements.
    async fn rollback(&self, session: SessionId) -> Result<(), BackendError>;
}

#[derive(Debug, Default)]
struct BackendState {
    staged: HashMap<SessionId, Vec<Statement>>,
    committed: Vec<Statement>,
    fail_next_execute: Option<String>,
    fail_next_commit: Option<String>,
}

/// In-memory backend that stages statements per session.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    state: Arc<Mutex<BackendState>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `execute` call fail with the given reason.
    pub async fn fail_next_execute(&self, reason: impl Into<String>) {
        self.state.lock().await.fail_next_execute = Some(reason.into());
    }

    /// Makes the next `commit` call fail with the given reason. The
    /// transaction stays open.
    pub async fn fail_next_commit(&self, reason: impl Into<String>) {
        self.state.lock().await.fail_next_commit = Some(reason.into());
    }

    /// Returns every committed statement in commit order.
    pub async fn committed(&self) -> Vec<Statement> {
        self.state.lock().await.committed.clone()
    }

    /// Returns the number of transactions that are open.
    pub async fn open_transactions(&self) -> usize {
        self.state.lock().await.staged.len()
    }
}

#[async_trait]
impl Backend for InMemoryBackend {
    async fn begin(&self, session: SessionId) -> Result<(), BackendError> {
        let mut state = self.state.lock().await;
        if state.staged.contains_key(&session) {
            return Err(BackendError::new(format!(
                "transaction already open for session {session}"
            )));
        }
        state.staged.insert(session, Vec::new());
        Ok(())
    }

    async fn execute(
        &self,
        session: SessionId,
        statement: &Statement,
    ) -> Result<u64, BackendError> {
        let mut state = self.state.lock().await;
        if let Some(reason) = state.fail_next_execute.take() {
            return Err(BackendError::new(reason));
        }
        let staged = state
            .staged
            .get_mut(&session)
            .ok_or_else(|| BackendError::new(format!("no open transaction for {session}")))?;
        staged.push(statement.clone());
        Ok(1)
    }

    async fn commit(&self, session: SessionId) -> Result<(), BackendError> {
        let mut state = self.state.lock().await;
        if let Some(reason) = state.fail_next_commit.take() {
            return Err(BackendError::new(reason));
        }
        let staged = state
            .staged
            .remove(&session)
            .ok_or_else(|| BackendError::new(format!("no open transaction for {session}")))?;
        state.committed.extend(staged);
        Ok(())
    }

    async fn rollback(&self, session: SessionId) -> Result<(), BackendError> {
        self.state.lock().await.staged.remove(&session);
        Ok(())
    }
}
