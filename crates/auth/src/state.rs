//! Application state for auth.

use std::sync::Arc;

use regit_core::auth::SessionRepository;
use regit_core::storage::UserRepository;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::oauth::OAuthClient;
use crate::providers::ProviderRegistry;
use crate::sessions::ScopedSessions;

/// Shared state for auth handlers and the `CurrentUser` extractor.
///
/// Parent application states expose it through `axum::extract::FromRef`.
#[derive(Clone)]
pub struct AuthState {
    pub users: Arc<dyn UserRepository>,
    pub oauth: OAuthClient,
    /// Authenticated sessions holding `user_id`.
    pub cross_site: ScopedSessions,
    /// Return-URL sessions living for one provider round trip.
    pub same_site: ScopedSessions,
}

impl AuthState {
    /// Wires the session scopes and OAuth client onto one session store.
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        users: Arc<dyn UserRepository>,
        providers: ProviderRegistry,
        config: &AuthConfig,
    ) -> Self {
        Self {
            users,
            oauth: OAuthClient::new(providers, sessions.clone(), config),
            cross_site: ScopedSessions::cross_site(sessions.clone(), config),
            same_site: ScopedSessions::same_site(sessions, config),
        }
    }

    /// Creates the state with the providers enabled by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if provider initialization fails (e.g., OIDC discovery).
    pub async fn from_config(
        sessions: Arc<dyn SessionRepository>,
        users: Arc<dyn UserRepository>,
        config: &AuthConfig,
    ) -> Result<Self, AuthError> {
        let providers = ProviderRegistry::from_config(config).await?;
        Ok(Self::new(sessions, users, providers, config))
    }
}
