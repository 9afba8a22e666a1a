use async_trait::async_trait;
use url::Url;

use super::{AuthError, AuthFlowState, ProviderIdentity, Session, SessionId, SessionScope};

/// Result type for auth operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Abstraction over OAuth identity providers.
///
/// One implementation per provider, looked up by [`name`](Self::name) from
/// the `:provider` path segment.
#[async_trait]
pub trait OAuthProviderClient: Send + Sync {
    /// Generate authorization URL for user redirect.
    async fn authorization_url(&self, state: &str, pkce_challenge: &str) -> Result<Url>;

    /// Exchange authorization code for the user's identity.
    async fn exchange_code(&self, code: &str, pkce_verifier: &str) -> Result<ProviderIdentity>;

    /// Path name of this provider (e.g. `google`).
    fn name(&self) -> &str;
}

/// Scoped key/value session storage.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Load a session by scope and ID. Expiry is checked by the caller.
    async fn load_session(&self, scope: SessionScope, id: &SessionId) -> Result<Option<Session>>;

    /// Insert or replace a session.
    async fn save_session(&self, session: &Session) -> Result<()>;

    /// Delete a session. Deleting a missing session is not an error.
    async fn delete_session(&self, scope: SessionScope, id: &SessionId) -> Result<()>;

    /// Store PKCE/state for an auth flow (short TTL).
    async fn store_auth_flow(&self, state: &str, flow: &AuthFlowState) -> Result<()>;

    /// Retrieve and delete auth flow state.
    async fn take_auth_flow(&self, state: &str) -> Result<Option<AuthFlowState>>;
}
