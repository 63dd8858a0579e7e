//! Lookup table for sessions driven across several requests.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::backend::Backend;
use crate::session::{SessionId, TransactionSession};

/// A session shared behind its own lock, so each session keeps a single
/// writer while different sessions proceed independently.
pub type SharedSession<B> = Arc<Mutex<TransactionSession<B>>>;

/// Sessions keyed by id.
///
/// Finished sessions stay readable until the registry reaches its retention
/// limit; the next insert then drops every committed or rolled back session.
/// Idle and started sessions are never dropped.
pub struct SessionRegistry<B: Backend> {
    sessions: Arc<RwLock<HashMap<SessionId, SharedSession<B>>>>,
    retention: usize,
}

impl<B: Backend> SessionRegistry<B> {
    /// Default number of sessions held before finished ones are pruned.
    pub const DEFAULT_RETENTION: usize = 256;

    pub fn new() -> Self {
        Self::with_retention(Self::DEFAULT_RETENTION)
    }

    /// Creates a registry that prunes finished sessions once it holds
    /// `retention` entries (minimum one).
    pub fn with_retention(retention: usize) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            retention: retention.max(1),
        }
    }

    pub fn retention(&self) -> usize {
        self.retention
    }

    /// Registers a session and returns its id.
    pub async fn insert(&self, session: TransactionSession<B>) -> SessionId {
        let id = session.id();
        let mut sessions = self.sessions.write().await;
        if sessions.len() >= self.retention {
            let pruned = prune(&mut sessions);
            if pruned > 0 {
                tracing::debug!(pruned, remaining = sessions.len(), "finished sessions pruned");
            }
        }
        sessions.insert(id, Arc::new(Mutex::new(session)));
        metrics::gauge!("gateway_sessions_registered").set(sessions.len() as f64);
        id
    }

    /// Drops every committed or rolled back session and returns how many
    /// were removed.
    pub async fn prune_terminal(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let pruned = prune(&mut sessions);
        metrics::gauge!("gateway_sessions_registered").set(sessions.len() as f64);
        pruned
    }

    pub async fn get(&self, id: SessionId) -> Option<SharedSession<B>> {
        self.sessions.read().await.get(&id).cloned()
    }

    pub async fn remove(&self, id: SessionId) -> Option<SharedSession<B>> {
        let mut sessions = self.sessions.write().await;
        let removed = sessions.remove(&id);
        metrics::gauge!("gateway_sessions_registered").set(sessions.len() as f64);
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

// A session locked by an in-flight request is still in use and is kept.
fn prune<B: Backend>(sessions: &mut HashMap<SessionId, SharedSession<B>>) -> usize {
    let before = sessions.len();
    sessions.retain(|_, session| match session.try_lock() {
        Ok(session) => !session.state().is_terminal(),
        Err(_) => true,
    });
    before - sessions.len()
}

impl<B: Backend> Clone for SessionRegistry<B> {
    fn clone(&self) -> Self {
        Self {
            sessions: Arc::clone(&self.sessions),
            retention: self.retention,
        }
    }
}

impl<B: Backend> Default for SessionRegistry<B> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryBackend;
    use crate::gateway::{GatewayConfig, TransactionalGateway};
    use crate::state::SessionState;

    #[tokio::test]
    async fn test_insert_get_remove() {
        let gw = TransactionalGateway::new(InMemoryBackend::new(), GatewayConfig::default());
        let registry = SessionRegistry::new();

        let id = registry.insert(gw.open_session()).await;
        assert_eq!(registry.len().await, 1);

        let session = registry.get(id).await.unwrap();
        session.lock().await.begin().await.unwrap();
        assert_eq!(
            registry.get(id).await.unwrap().lock().await.state(),
            SessionState::Started
        );

        assert!(registry.remove(id).await.is_some());
        assert!(registry.get(id).await.is_none());
        assert!(registry.is_empty().await);
    }

    async fn finished_session(
        gw: &TransactionalGateway<InMemoryBackend>,
        registry: &SessionRegistry<InMemoryBackend>,
    ) -> SessionId {
        let id = registry.insert(gw.open_session()).await;
        let session = registry.get(id).await.unwrap();
        let mut session = session.lock().await;
        session.begin().await.unwrap();
        session.commit().await.unwrap();
        id
    }

    #[tokio::test]
    async fn test_prune_terminal_keeps_live_sessions() {
        let gw = TransactionalGateway::new(InMemoryBackend::new(), GatewayConfig::default());
        let registry = SessionRegistry::new();

        let idle = registry.insert(gw.open_session()).await;
        let started = registry.insert(gw.open_session()).await;
        registry
            .get(started)
            .await
            .unwrap()
            .lock()
            .await
            .begin()
            .await
            .unwrap();
        let committed = finished_session(&gw, &registry).await;
        assert_eq!(registry.len().await, 3);

        assert_eq!(registry.prune_terminal().await, 1);
        assert_eq!(registry.len().await, 2);
        assert!(registry.get(idle).await.is_some());
        assert!(registry.get(started).await.is_some());
        assert!(registry.get(committed).await.is_none());
    }

    #[tokio::test]
    async fn test_registry_shrinks_at_retention_limit() {
        let gw = TransactionalGateway::new(InMemoryBackend::new(), GatewayConfig::default());
        let registry = SessionRegistry::with_retention(4);

        for _ in 0..4 {
            finished_session(&gw, &registry).await;
        }
        assert_eq!(registry.len().await, 4);

        let fresh = registry.insert(gw.open_session()).await;
        assert_eq!(registry.len().await, 1);
        assert!(registry.get(fresh).await.is_some());

        for _ in 0..100 {
            finished_session(&gw, &registry).await;
        }
        assert!(registry.len().await <= 4);
    }

    #[tokio::test]
    async fn test_busy_session_survives_pruning() {
        let gw = TransactionalGateway::new(InMemoryBackend::new(), GatewayConfig::default());
        let registry = SessionRegistry::new();

        let id = finished_session(&gw, &registry).await;
        let session = registry.get(id).await.unwrap();
        let _guard = session.lock().await;

        assert_eq!(registry.prune_terminal().await, 0);
        assert!(registry.get(id).await.is_some());
    }
}
