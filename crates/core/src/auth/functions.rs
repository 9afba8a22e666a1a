use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use rand::{distr::Alphanumeric, Rng};
use uuid::Uuid;

use crate::chat::User;

use super::{AuthError, AuthFlowState, ProviderIdentity, Session, SessionId, USER_ID_KEY};

/// Generate a cryptographically random session ID.
pub fn generate_session_id() -> SessionId {
    let id: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect();
    SessionId::new(id)
}

/// Generate a random state parameter for CSRF protection.
pub fn generate_state() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Check if a session has expired.
pub fn is_session_expired(session: &Session, now: DateTime<Utc>) -> bool {
    session.expires_at <= now
}

/// Check if a pending auth flow is older than `ttl`.
pub fn is_flow_expired(flow: &AuthFlowState, now: DateTime<Utc>, ttl: Duration) -> bool {
    flow.created_at + ttl <= now
}

/// Calculate session expiry from creation time and TTL.
pub fn calculate_expiry(created_at: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    created_at + ttl
}

/// Decode a base64 (standard alphabet) return URL.
///
/// The decoded value is used verbatim as the redirect target.
pub fn decode_return_url(encoded: &str) -> Result<String, AuthError> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| AuthError::InvalidReturnUrl(e.to_string()))?;

    String::from_utf8(bytes).map_err(|e| AuthError::InvalidReturnUrl(e.to_string()))
}

/// Extract the logged-in user's ID from a cross-site session.
///
/// Returns `None` when `user_id` is absent, is not a UUID string, or is the
/// nil UUID. Callers treat all three the same way.
pub fn resolve_user_id(session: &Session) -> Option<Uuid> {
    session
        .get_str(USER_ID_KEY)
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .filter(|id| !id.is_nil())
}

/// Build the user record created on a first login.
pub fn user_from_identity(identity: &ProviderIdentity) -> User {
    User::new(&identity.provider_user_id)
        .with_email(&identity.email)
        .with_first_name(&identity.first_name)
        .with_last_name(&identity.last_name)
        .with_nickname(&identity.nickname)
}
