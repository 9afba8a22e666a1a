//! Redis session storage implementation.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use fred::prelude::*;
use regit_core::auth::{
    AuthError, AuthFlowState, Result, Session, SessionId, SessionRepository, SessionScope,
};

/// Redis-backed session storage.
///
/// Sessions expire through Redis TTLs derived from `Session::expires_at`.
pub struct RedisSessionStore {
    pool: Pool,
    flow_ttl: Duration,
}

impl RedisSessionStore {
    /// Creates a new Redis session store.
    ///
    /// # Arguments
    ///
    /// * `pool` - Redis connection pool
    /// * `flow_ttl` - TTL for pending login state
    pub fn new(pool: Pool, flow_ttl: Duration) -> Self {
        Self { pool, flow_ttl }
    }

    fn session_key(scope: SessionScope, id: &SessionId) -> String {
        format!("session:{}:{}", scope, id)
    }

    fn flow_key(state: &str) -> String {
        format!("auth_flow:{}", state)
    }
}

#[async_trait]
impl SessionRepository for RedisSessionStore {
    async fn load_session(&self, scope: SessionScope, id: &SessionId) -> Result<Option<Session>> {
        let key = Self::session_key(scope, id);
        let value: Option<String> = self
            .pool
            .get(&key)
            .await
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        match value {
            Some(json) => {
                let session: Session =
                    serde_json::from_str(&json).map_err(|e| AuthError::Storage(e.to_string()))?;
                Ok(Some(session))
            }
            None => Ok(None),
        }
    }

    async fn save_session(&self, session: &Session) -> Result<()> {
        let key = Self::session_key(session.scope, &session.id);
        let value =
            serde_json::to_string(session).map_err(|e| AuthError::Storage(e.to_string()))?;

        let ttl_secs = (session.expires_at - Utc::now()).num_seconds();
        if ttl_secs <= 0 {
            return self.delete_session(session.scope, &session.id).await;
        }

        self.pool
            .set::<(), _, _>(&key, &value, Some(Expiration::EX(ttl_secs)), None, false)
            .await
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        Ok(())
    }

    async fn delete_session(&self, scope: SessionScope, id: &SessionId) -> Result<()> {
        self.pool
            .del::<(), _>(&Self::session_key(scope, id))
            .await
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        Ok(())
    }

    async fn store_auth_flow(&self, state: &str, flow: &AuthFlowState) -> Result<()> {
        let key = Self::flow_key(state);
        let value = serde_json::to_string(flow).map_err(|e| AuthError::Storage(e.to_string()))?;

        let ttl_secs = self.flow_ttl.as_secs() as i64;

        self.pool
            .set::<(), _, _>(&key, &value, Some(Expiration::EX(ttl_secs)), None, false)
            .await
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        Ok(())
    }

    async fn take_auth_flow(&self, state: &str) -> Result<Option<AuthFlowState>> {
        let key = Self::flow_key(state);

        // Get and delete atomically
        let value: Option<String> = self
            .pool
            .getdel(&key)
            .await
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        match value {
            Some(json) => {
                let flow: AuthFlowState =
                    serde_json::from_str(&json).map_err(|e| AuthError::Storage(e.to_string()))?;
                Ok(Some(flow))
            }
            None => Ok(None),
        }
    }
}
