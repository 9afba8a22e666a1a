//! Test doubles shared by this crate's unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use regit_core::auth::{OAuthProviderClient, ProviderIdentity, Result as AuthResult};
use regit_core::chat::User;
use regit_core::storage::{RepositoryError, Result, UserRepository};
use tokio::sync::RwLock;
use url::Url;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::providers::ProviderRegistry;
use crate::sessions::InMemorySessionStore;
use crate::AuthState;

#[derive(Clone, Default)]
pub struct TestUsers {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl TestUsers {
    pub async fn count(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn clear(&self) {
        self.users.write().await.clear();
    }
}

#[async_trait]
impl UserRepository for TestUsers {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn get_user_by_provider_id(&self, provider_user_id: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.provider_user_id == provider_user_id)
            .cloned())
    }

    async fn create_user(&self, user: &User) -> Result<()> {
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|u| u.provider_user_id == user.provider_user_id)
        {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "User",
                id: user.provider_user_id.clone(),
            });
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_or_create_user(&self, candidate: &User) -> Result<User> {
        let mut users = self.users.write().await;
        if let Some(existing) = users
            .values()
            .find(|u| u.provider_user_id == candidate.provider_user_id)
        {
            return Ok(existing.clone());
        }
        users.insert(candidate.id, candidate.clone());
        Ok(candidate.clone())
    }
}

/// Provider that treats the authorization code as the subject. Each exchange
/// reports a new nickname so tests can tell whether a user was refreshed.
#[derive(Default)]
pub struct StubProvider {
    exchanges: AtomicUsize,
}

#[async_trait]
impl OAuthProviderClient for StubProvider {
    async fn authorization_url(&self, state: &str, _pkce_challenge: &str) -> AuthResult<Url> {
        let mut url = Url::parse("https://idp.example.com/authorize").unwrap();
        url.query_pairs_mut().append_pair("state", state);
        Ok(url)
    }

    async fn exchange_code(&self, code: &str, _pkce_verifier: &str) -> AuthResult<ProviderIdentity> {
        let n = self.exchanges.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(ProviderIdentity {
            provider: "stub".to_string(),
            provider_user_id: code.to_string(),
            email: format!("{code}@example.com"),
            nickname: format!("nick-{code}-{n}"),
            ..Default::default()
        })
    }

    fn name(&self) -> &str {
        "stub"
    }
}

pub fn test_config() -> AuthConfig {
    AuthConfig::new(Url::parse("http://127.0.0.1:3388").unwrap())
}

pub fn test_state(users: TestUsers) -> AuthState {
    test_state_with(users, &test_config()).0
}

/// State over a fresh in-memory store, returned alongside so tests can
/// inspect what the handlers left behind.
pub fn test_state_with(users: TestUsers, config: &AuthConfig) -> (AuthState, InMemorySessionStore) {
    let providers = ProviderRegistry::new().with(Arc::new(StubProvider::default()));
    let store = InMemorySessionStore::new(config.flow_ttl);

    let state = AuthState::new(Arc::new(store.clone()), Arc::new(users), providers, config);
    (state, store)
}
