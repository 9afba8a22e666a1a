//! Provider-agnostic OAuth login flow.
//!
//! [`OAuthClient`] owns the per-login artifacts: the CSRF state and PKCE
//! verifier stored in the session store, and the `regit_oauth` cookie that
//! binds them to the browser that started the login.

use std::sync::Arc;

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use openidconnect::PkceCodeChallenge;
use regit_core::auth::{
    generate_state, is_flow_expired, AuthError as CoreError, AuthFlowState, OAuthProviderClient,
    ProviderIdentity, SessionRepository,
};
use serde::Deserialize;
use url::Url;

use crate::config::{AuthConfig, OAUTH_COOKIE};
use crate::error::AuthError;
use crate::providers::ProviderRegistry;

/// Query parameters the provider sends to the callback.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[derive(Clone)]
pub struct OAuthClient {
    providers: ProviderRegistry,
    store: Arc<dyn SessionRepository>,
    flow_ttl: chrono::Duration,
    cookie_secure: bool,
}

impl OAuthClient {
    pub fn new(
        providers: ProviderRegistry,
        store: Arc<dyn SessionRepository>,
        config: &AuthConfig,
    ) -> Self {
        Self {
            providers,
            store,
            flow_ttl: chrono::Duration::from_std(config.flow_ttl)
                .unwrap_or(chrono::Duration::minutes(10)),
            cookie_secure: config.cookie_secure,
        }
    }

    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    /// Look up a provider by its path name.
    pub fn provider(&self, name: &str) -> Result<Arc<dyn OAuthProviderClient>, AuthError> {
        self.providers
            .get(name)
            .ok_or_else(|| AuthError::ProviderNotConfigured(name.to_string()))
    }

    /// Start a login: record state and PKCE verifier, and return the
    /// provider URL to redirect the browser to.
    pub async fn begin(&self, provider: &str, jar: CookieJar) -> Result<(CookieJar, Url), AuthError> {
        let client = self.provider(provider)?;

        let state = generate_state();
        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let flow = AuthFlowState {
            pkce_verifier: pkce_verifier.secret().to_string(),
            provider: provider.to_string(),
            created_at: Utc::now(),
        };
        self.store.store_auth_flow(&state, &flow).await?;

        let url = client
            .authorization_url(&state, pkce_challenge.as_str())
            .await?;

        tracing::debug!(provider = %provider, "Redirecting to provider");

        Ok((jar.add(self.flow_cookie(state)), url))
    }

    /// Finish a login and return the identity the provider vouches for.
    ///
    /// The pending flow is consumed before any check so a state can never be
    /// replayed, whether or not this call succeeds.
    pub async fn complete(
        &self,
        provider: &str,
        query: &CallbackQuery,
        jar: CookieJar,
    ) -> Result<(CookieJar, ProviderIdentity), AuthError> {
        let client = self.provider(provider)?;

        let state = query
            .state
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(CoreError::InvalidState)?;

        let flow = self
            .store
            .take_auth_flow(state)
            .await?
            .ok_or(CoreError::FlowNotFound)?;

        let bound_state = jar.get(OAUTH_COOKIE).map(|c| c.value().to_string());
        if bound_state.as_deref() != Some(state) || flow.provider != provider {
            tracing::warn!(provider = %provider, "OAuth state does not match this browser");
            return Err(CoreError::InvalidState.into());
        }

        if is_flow_expired(&flow, Utc::now(), self.flow_ttl) {
            return Err(CoreError::FlowNotFound.into());
        }

        if let Some(error) = &query.error {
            return Err(AuthError::ProviderRejected(error.clone()));
        }

        let code = query
            .code
            .as_deref()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AuthError::ProviderRejected("missing authorization code".to_string()))?;

        let identity = client.exchange_code(code, &flow.pkce_verifier).await?;
        if identity.provider_user_id.is_empty() {
            return Err(CoreError::InvalidIdentity("empty provider user id".to_string()).into());
        }

        tracing::info!(provider = %provider, "OAuth login completed");

        Ok((jar.remove(self.flow_removal_cookie()), identity))
    }

    /// Drop any pending login bound to this browser.
    pub async fn logout(&self, jar: CookieJar) -> Result<CookieJar, AuthError> {
        if let Some(cookie) = jar.get(OAUTH_COOKIE) {
            self.store.take_auth_flow(cookie.value()).await?;
        }

        Ok(jar.remove(self.flow_removal_cookie()))
    }

    fn flow_cookie(&self, state: String) -> Cookie<'static> {
        Cookie::build((OAUTH_COOKIE, state))
            .path("/")
            .http_only(true)
            .secure(self.cookie_secure)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::seconds(self.flow_ttl.num_seconds()))
            .build()
    }

    fn flow_removal_cookie(&self) -> Cookie<'static> {
        Cookie::build(OAUTH_COOKIE).path("/").build()
    }
}
