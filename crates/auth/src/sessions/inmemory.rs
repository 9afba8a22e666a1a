//! In-memory session storage for development and tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use regit_core::auth::{
    is_flow_expired, is_session_expired, AuthFlowState, Result, Session, SessionId,
    SessionRepository, SessionScope,
};

/// In-memory session store.
///
/// Stores sessions and auth flow state in HashMaps wrapped in `Arc<RwLock<_>>`.
/// Data is not persisted and will be lost when the store is dropped.
///
/// Expired sessions are dropped on every save and flows older than the flow
/// TTL on every new flow, so abandoned logins do not accumulate.
#[derive(Debug, Clone)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<(SessionScope, String), Session>>>,
    auth_flows: Arc<RwLock<HashMap<String, AuthFlowState>>>,
    flow_ttl: chrono::Duration,
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new(Duration::from_secs(10 * 60))
    }
}

impl InMemorySessionStore {
    /// Creates an empty store whose pending flows live for `flow_ttl`.
    pub fn new(flow_ttl: Duration) -> Self {
        Self {
            sessions: Arc::default(),
            auth_flows: Arc::default(),
            flow_ttl: chrono::Duration::from_std(flow_ttl)
                .unwrap_or(chrono::Duration::minutes(10)),
        }
    }

    /// Number of stored sessions and pending flows.
    #[cfg(test)]
    pub(crate) async fn entry_counts(&self) -> (usize, usize) {
        (
            self.sessions.read().await.len(),
            self.auth_flows.read().await.len(),
        )
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionStore {
    async fn load_session(&self, scope: SessionScope, id: &SessionId) -> Result<Option<Session>> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(&(scope, id.as_str().to_string())).cloned())
    }

    async fn save_session(&self, session: &Session) -> Result<()> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, s| !is_session_expired(s, now));
        sessions.insert(
            (session.scope, session.id.as_str().to_string()),
            session.clone(),
        );
        Ok(())
    }

    async fn delete_session(&self, scope: SessionScope, id: &SessionId) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        sessions.remove(&(scope, id.as_str().to_string()));
        Ok(())
    }

    async fn store_auth_flow(&self, state: &str, flow: &AuthFlowState) -> Result<()> {
        let now = Utc::now();
        let mut flows = self.auth_flows.write().await;
        flows.retain(|_, f| !is_flow_expired(f, now, self.flow_ttl));
        flows.insert(state.to_string(), flow.clone());
        Ok(())
    }

    async fn take_auth_flow(&self, state: &str) -> Result<Option<AuthFlowState>> {
        let mut flows = self.auth_flows.write().await;
        Ok(flows.remove(state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_session(id: &str, scope: SessionScope) -> Session {
        let mut session = Session::new(
            SessionId::new(id.to_string()),
            scope,
            Utc::now(),
            Utc::now() + chrono::Duration::hours(24),
        );
        session.set("user_id", "user-123");
        session
    }

    fn create_test_auth_flow(verifier: &str) -> AuthFlowState {
        AuthFlowState {
            pkce_verifier: verifier.to_string(),
            provider: "google".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_session_save_and_load() {
        let store = InMemorySessionStore::default();
        let session = create_test_session("session-1", SessionScope::CrossSite);

        store.save_session(&session).await.unwrap();

        let retrieved = store
            .load_session(SessionScope::CrossSite, &session.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(retrieved, session);
    }

    #[tokio::test]
    async fn test_session_save_replaces_values() {
        let store = InMemorySessionStore::default();
        let mut session = create_test_session("session-1", SessionScope::CrossSite);
        store.save_session(&session).await.unwrap();

        session.values.clear();
        store.save_session(&session).await.unwrap();

        let retrieved = store
            .load_session(SessionScope::CrossSite, &session.id)
            .await
            .unwrap()
            .unwrap();
        assert!(retrieved.get("user_id").is_none());
    }

    #[tokio::test]
    async fn test_session_lookup_is_scoped() {
        let store = InMemorySessionStore::default();
        let session = create_test_session("session-1", SessionScope::SameSite);

        store.save_session(&session).await.unwrap();

        let other_scope = store
            .load_session(SessionScope::CrossSite, &session.id)
            .await
            .unwrap();
        assert!(other_scope.is_none());
    }

    #[tokio::test]
    async fn test_session_delete() {
        let store = InMemorySessionStore::default();
        let session = create_test_session("session-1", SessionScope::CrossSite);

        store.save_session(&session).await.unwrap();
        store
            .delete_session(SessionScope::CrossSite, &session.id)
            .await
            .unwrap();

        let retrieved = store
            .load_session(SessionScope::CrossSite, &session.id)
            .await
            .unwrap();
        assert!(retrieved.is_none());
    }

    #[tokio::test]
    async fn test_session_delete_nonexistent() {
        let store = InMemorySessionStore::default();

        let result = store
            .delete_session(
                SessionScope::CrossSite,
                &SessionId::new("nonexistent".to_string()),
            )
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_auth_flow_store_and_take() {
        let store = InMemorySessionStore::default();

        store
            .store_auth_flow("state-abc", &create_test_auth_flow("test-verifier"))
            .await
            .unwrap();

        let retrieved = store.take_auth_flow("state-abc").await.unwrap().unwrap();
        assert_eq!(retrieved.pkce_verifier, "test-verifier");

        // Single use
        assert!(store.take_auth_flow("state-abc").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_auth_flow_overwrite() {
        let store = InMemorySessionStore::default();

        store
            .store_auth_flow("same-state", &create_test_auth_flow("verifier-1"))
            .await
            .unwrap();
        store
            .store_auth_flow("same-state", &create_test_auth_flow("verifier-2"))
            .await
            .unwrap();

        let retrieved = store.take_auth_flow("same-state").await.unwrap().unwrap();
        assert_eq!(retrieved.pkce_verifier, "verifier-2");
    }

    #[tokio::test]
    async fn test_clone_shares_state() {
        let store = InMemorySessionStore::default();
        let clone = store.clone();

        let session = create_test_session("session-1", SessionScope::CrossSite);
        store.save_session(&session).await.unwrap();

        let retrieved = clone
            .load_session(SessionScope::CrossSite, &session.id)
            .await
            .unwrap();
        assert!(retrieved.is_some());
    }

    #[tokio::test]
    async fn test_save_drops_expired_sessions() {
        let store = InMemorySessionStore::default();
        let mut stale = create_test_session("stale", SessionScope::SameSite);
        stale.expires_at = Utc::now() - chrono::Duration::seconds(1);
        store.save_session(&stale).await.unwrap();

        let fresh = create_test_session("fresh", SessionScope::CrossSite);
        store.save_session(&fresh).await.unwrap();

        assert!(store
            .load_session(SessionScope::SameSite, &stale.id)
            .await
            .unwrap()
            .is_none());
        assert_eq!(store.entry_counts().await, (1, 0));
    }

    #[tokio::test]
    async fn test_store_drops_flows_older_than_ttl() {
        let store = InMemorySessionStore::new(Duration::from_secs(60));

        let mut abandoned = create_test_auth_flow("old");
        abandoned.created_at = Utc::now() - chrono::Duration::minutes(5);
        store.store_auth_flow("abandoned", &abandoned).await.unwrap();
        store
            .store_auth_flow("current", &create_test_auth_flow("new"))
            .await
            .unwrap();

        assert!(store.take_auth_flow("abandoned").await.unwrap().is_none());
        assert!(store.take_auth_flow("current").await.unwrap().is_some());
    }
}
