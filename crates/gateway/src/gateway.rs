//! The transactional gateway and its mode flag.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use crate::backend::Backend;
use crate::error::Result;
use crate::session::{TransactionMode, TransactionSession};
use crate::statement::{Statement, StatementPredicate, StatementResult};

/// Gateway construction parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Initial auto-transaction handling mode.
    pub auto_transaction: bool,
    /// Shape every executed statement must have.
    pub expected: StatementPredicate,
}

/// Opens transaction sessions against a backend.
///
/// The auto-transaction flag lives on the gateway instance and is shared by
/// its clones. Sessions capture the flag when they are opened.
#[derive(Debug, Clone)]
pub struct TransactionalGateway<B> {
    backend: B,
    expected: StatementPredicate,
    auto_transaction: Arc<AtomicBool>,
}

impl<B: Backend + Clone> TransactionalGateway<B> {
    pub fn new(backend: B, config: GatewayConfig) -> Self {
        Self {
            backend,
            expected: config.expected,
            auto_transaction: Arc::new(AtomicBool::new(config.auto_transaction)),
        }
    }

    /// Opens an `Idle` session in the current mode.
    pub fn open_session(&self) -> TransactionSession<B> {
        TransactionSession::new(
            self.backend.clone(),
            TransactionMode::from_flag(self.auto_transaction()),
            self.expected.clone(),
        )
    }

    /// Runs one statement in its own transaction, whatever the mode.
    ///
    /// In auto mode the session wraps the statement itself; otherwise the
    /// full begin, execute, commit-or-rollback sequence is driven here.
    #[tracing::instrument(skip(self, statement), fields(sql = %statement.sql))]
    pub async fn run_statement(&self, statement: Statement) -> Result<StatementResult> {
        let mut session = self.open_session();

        if session.mode() == TransactionMode::Auto {
            return session.execute(statement).await;
        }

        session.begin().await?;
        let result = session.execute(statement).await?;
        if result.is_success() {
            session.commit().await?;
        } else {
            session.rollback().await?;
        }
        Ok(result)
    }

    pub fn auto_transaction(&self) -> bool {
        self.auto_transaction.load(Ordering::SeqCst)
    }

    pub fn set_auto_transaction(&self, enabled: bool) {
        let previous = self.auto_transaction.swap(enabled, Ordering::SeqCst);
        if previous != enabled {
            tracing::info!(auto_transaction = enabled, "Gateway mode changed");
        }
    }

    /// Sets the mode until the returned guard is dropped, then restores
    /// the previous value.
    pub fn scoped_auto_transaction(&self, enabled: bool) -> AutoTransactionGuard {
        let previous = self.auto_transaction.swap(enabled, Ordering::SeqCst);
        AutoTransactionGuard {
            flag: Arc::clone(&self.auto_transaction),
            previous,
        }
    }

    pub fn expected(&self) -> &StatementPredicate {
        &self.expected
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

/// Restores the gateway's auto-transaction flag on drop.
#[derive(Debug)]
#[must_use = "the previous mode is restored as soon as the guard is dropped"]
pub struct AutoTransactionGuard {
    flag: Arc<AtomicBool>,
    previous: bool,
}

impl Drop for AutoTransactionGuard {
    fn drop(&mut self) {
        self.flag.store(self.previous, Ordering::SeqCst);
    }
}
