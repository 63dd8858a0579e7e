//! Transaction sessions.

use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::Backend;
use crate::error::{BackendError, GatewayError, Result, StatementFailure};
use crate::messages::{GatewayReply, GatewayRequest, Operation};
use crate::state::SessionState;
use crate::statement::{Statement, StatementPredicate, StatementRecord, StatementResult};

/// Unique identifier for a transaction session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// How the begin/commit envelope around statements is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionMode {
    /// The caller drives begin, execute and commit or rollback.
    Explicit,
    /// A lone execute is wrapped in begin/commit by the session.
    Auto,
}

impl TransactionMode {
    pub fn from_flag(auto_transaction: bool) -> Self {
        if auto_transaction {
            TransactionMode::Auto
        } else {
            TransactionMode::Explicit
        }
    }
}

/// One begin-to-terminal-state run of the transaction protocol.
///
/// A session has a single writer: every operation takes `&mut self`.
pub struct TransactionSession<B: Backend> {
    id: SessionId,
    mode: TransactionMode,
    state: SessionState,
    predicate: StatementPredicate,
    statements: Vec<StatementRecord>,
    failed: bool,
    backend: B,
}

impl<B: Backend> TransactionSession<B> {
    pub fn new(backend: B, mode: TransactionMode, predicate: StatementPredicate) -> Self {
        Self {
            id: SessionId::new(),
            mode,
            state: SessionState::Idle,
            predicate,
            statements: Vec::new(),
            failed: false,
            backend,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn mode(&self) -> TransactionMode {
        self.mode
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The statement log, in execution order.
    pub fn statements(&self) -> &[StatementRecord] {
        &self.statements
    }

    /// Returns true once a statement in this transaction has failed.
    pub fn has_failed_statement(&self) -> bool {
        self.failed
    }

    /// `startTransaction`.
    pub async fn begin(&mut self) -> Result<()> {
        self.ensure_open(Operation::StartTransaction)?;
        if !self.state.can_begin() {
            return Err(self
                .abort(Operation::StartTransaction, "transaction already started")
                .await);
        }

        self.backend.begin(self.id).await?;
        self.state = SessionState::Started;
        tracing::debug!(session_id = %self.id, "Transaction started");
        Ok(())
    }

    /// `execute(sql)`.
    ///
    /// A statement that fails to match or is refused by the backend is
    /// reported as a [`StatementResult::Failure`], not as an error. In an
    /// explicit transaction the only legal next step is then `rollback`.
    #[tracing::instrument(skip(self, statement), fields(sql = %statement.sql))]
    pub async fn execute(&mut self, statement: Statement) -> Result<StatementResult> {
        self.ensure_open(Operation::Execute)?;

        match self.state {
            SessionState::Idle if self.mode == TransactionMode::Auto => {
                self.execute_wrapped(statement).await
            }
            SessionState::Idle => Err(self
                .abort(Operation::Execute, "no transaction started")
                .await),
            _ if self.failed => Err(self
                .abort(Operation::Execute, "a failed statement must be rolled back")
                .await),
            _ => Ok(self.run(statement).await),
        }
    }

    /// `commitTransaction`.
    pub async fn commit(&mut self) -> Result<()> {
        self.ensure_open(Operation::CommitTransaction)?;
        if !self.state.can_finish() {
            return Err(self
                .abort(Operation::CommitTransaction, "no transaction started")
                .await);
        }
        if self.failed {
            return Err(self
                .abort(
                    Operation::CommitTransaction,
                    "a failed statement must be rolled back",
                )
                .await);
        }

        if let Err(e) = self.backend.commit(self.id).await {
            return Err(self.backend_failed(e, true).await);
        }
        self.finish(SessionState::Committed, "committed");
        Ok(())
    }

    /// `rollbackTransaction`.
    pub async fn rollback(&mut self) -> Result<()> {
        self.ensure_open(Operation::RollbackTransaction)?;
        if !self.state.can_finish() {
            return Err(self
                .abort(Operation::RollbackTransaction, "no transaction started")
                .await);
        }

        if let Err(e) = self.backend.rollback(self.id).await {
            return Err(self.backend_failed(e, false).await);
        }
        self.finish(SessionState::RolledBack, "rolled_back");
        Ok(())
    }

    /// Dispatches a wire request and translates the outcome into a reply.
    ///
    /// Statement failures become `error(reason)` replies; protocol errors are
    /// returned as `Err`.
    pub async fn handle(&mut self, request: GatewayRequest) -> Result<GatewayReply> {
        match request {
            GatewayRequest::StartTransaction => {
                self.begin().await?;
                Ok(GatewayReply::success())
            }
            GatewayRequest::Execute { sql, params } => {
                let statement = Statement { sql, params };
                Ok(match self.execute(statement).await? {
                    StatementResult::Success { rows_updated } => {
                        GatewayReply::rows_updated(rows_updated)
                    }
                    StatementResult::Failure { reason } => GatewayReply::error(reason.to_string()),
                })
            }
            GatewayRequest::CommitTransaction => {
                self.commit().await?;
                Ok(GatewayReply::success())
            }
            GatewayRequest::RollbackTransaction => {
                self.rollback().await?;
                Ok(GatewayReply::success())
            }
        }
    }

    async fn execute_wrapped(&mut self, statement: Statement) -> Result<StatementResult> {
        self.backend.begin(self.id).await?;
        self.state = SessionState::Started;

        let result = self.run(statement).await;
        if result.is_success() {
            if let Err(e) = self.backend.commit(self.id).await {
                return Err(self.backend_failed(e, true).await);
            }
            self.finish(SessionState::Committed, "committed");
        } else {
            if let Err(e) = self.backend.rollback(self.id).await {
                return Err(self.backend_failed(e, false).await);
            }
            self.finish(SessionState::RolledBack, "rolled_back");
        }
        Ok(result)
    }

    async fn run(&mut self, statement: Statement) -> StatementResult {
        let result = if !self.predicate.matches(&statement) {
            StatementResult::Failure {
                reason: StatementFailure::StatementMismatch {
                    statement: statement.sql.clone(),
                    expected: self.predicate.describe(),
                },
            }
        } else {
            match self.backend.execute(self.id, &statement).await {
                Ok(rows_updated) => StatementResult::Success { rows_updated },
                Err(e) => StatementResult::Failure {
                    reason: StatementFailure::Rejected { reason: e.0 },
                },
            }
        };

        let label = if result.is_success() {
            "success"
        } else {
            self.failed = true;
            tracing::warn!(session_id = %self.id, sql = %statement.sql, "Statement failed");
            "failure"
        };
        metrics::counter!("gateway_statements_total", "result" => label).increment(1);

        self.statements.push(StatementRecord {
            statement,
            predicate: self.predicate.describe(),
            result: result.clone(),
            executed_at: Utc::now(),
        });
        result
    }

    fn ensure_open(&self, operation: Operation) -> Result<()> {
        if self.state.is_terminal() {
            return Err(GatewayError::SessionClosed {
                operation,
                state: self.state,
            });
        }
        Ok(())
    }

    /// Tears the session down after an out-of-sequence call.
    async fn abort(&mut self, operation: Operation, reason: &'static str) -> GatewayError {
        let state = self.state;
        if state == SessionState::Started
            && let Err(e) = self.backend.rollback(self.id).await
        {
            tracing::error!(session_id = %self.id, error = %e, "Rollback after protocol violation failed");
        }
        tracing::warn!(session_id = %self.id, %operation, %state, reason, "Protocol violation");
        self.finish(SessionState::RolledBack, "aborted");

        GatewayError::ProtocolViolation {
            operation,
            state,
            reason,
        }
    }

    /// Closes a started session whose backend call failed.
    ///
    /// The session always ends `RolledBack`; `rollback` asks the backend to
    /// discard whatever it still holds for the session.
    async fn backend_failed(&mut self, error: BackendError, rollback: bool) -> GatewayError {
        tracing::error!(session_id = %self.id, error = %error, "Backend call failed");
        if rollback && let Err(e) = self.backend.rollback(self.id).await {
            tracing::error!(session_id = %self.id, error = %e, "Rollback after backend failure failed");
        }
        self.finish(SessionState::RolledBack, "backend_failed");
        GatewayError::Backend(error)
    }

    fn finish(&mut self, state: SessionState, outcome: &'static str) {
        self.state = state;
        metrics::counter!("gateway_sessions_total", "outcome" => outcome).increment(1);
        let statements = self.statements.len();
        if state == SessionState::Committed {
            tracing::info!(session_id = %self.id, statements, "Transaction committed");
        } else {
            tracing::warn!(session_id = %self.id, outcome, statements, "Transaction rolled back");
        }
    }
}

impl<B: Backend> std::fmt::Debug for TransactionSession<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionSession")
            .field("id", &self.id)
            .field("mode", &self.mode)
            .field("state", &self.state)
            .field("statements", &self.statements.len())
            .finish()
    }
}
