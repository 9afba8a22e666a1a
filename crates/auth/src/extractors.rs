//! Axum extractors for authentication.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;
use regit_core::auth::resolve_user_id;
use regit_core::chat::User;

use crate::error::AuthError;
use crate::AuthState;

/// Extractor for the logged-in user.
///
/// Every failure (no cookie, unknown or expired session, missing or malformed
/// `user_id`, unknown user, store error) rejects with a bare 403.
pub struct CurrentUser(pub User);

impl<S> FromRequestParts<S> for CurrentUser
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);

        let session = match auth_state.cross_site.load(&jar).await {
            Ok(Some(session)) => session,
            Ok(None) => return Err(AuthError::Forbidden),
            Err(e) => {
                tracing::warn!(error = %e, "Session lookup failed");
                return Err(AuthError::Forbidden);
            }
        };

        let user_id = resolve_user_id(&session).ok_or(AuthError::Forbidden)?;

        match auth_state.users.get_user(user_id).await {
            Ok(Some(user)) => Ok(CurrentUser(user)),
            Ok(None) => {
                tracing::debug!(%user_id, "Session refers to unknown user");
                Err(AuthError::Forbidden)
            }
            Err(e) => {
                tracing::warn!(error = %e, %user_id, "User lookup failed");
                Err(AuthError::Forbidden)
            }
        }
    }
}
