//! HTTP handlers for auth routes.

use axum::{
    extract::{Path, Query, State},
    response::Redirect,
    routing::get,
    Router,
};
use axum_extra::extract::CookieJar;
use regit_core::auth::{
    decode_return_url, user_from_identity, DEFAULT_LANDING_PATH, NEXT_KEY, USER_ID_KEY,
};
use serde::Deserialize;

use crate::error::AuthError;
use crate::oauth::CallbackQuery;
use crate::AuthState;

/// Query parameters for login endpoints.
#[derive(Deserialize, Default)]
pub struct LoginQuery {
    /// Base64 URL to redirect to after successful authentication.
    pub r: Option<String>,
}

/// Creates the auth router with all authentication routes.
///
/// Routes:
/// - `GET /login/{provider}` - Remember `r` and redirect to the provider
/// - `GET /auth/callback/{provider}` - Finish login and issue the session
/// - `GET /logout` - End the current session
pub fn auth_routes() -> Router<AuthState> {
    Router::new()
        .route("/login/{provider}", get(login))
        .route("/auth/callback/{provider}", get(callback))
        .route("/logout", get(logout))
}

async fn login(
    State(state): State<AuthState>,
    Path(provider): Path<String>,
    Query(query): Query<LoginQuery>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), AuthError> {
    // Unknown providers fail before any session is written
    state.oauth.provider(&provider)?;

    let mut jar = jar;
    if let Some(next) = query.r.filter(|r| !r.is_empty()) {
        let mut session = state.same_site.get(&jar).await?;
        session.set(NEXT_KEY, next);
        jar = state.same_site.save(jar, &session).await?;
    }

    let (jar, url) = state.oauth.begin(&provider, jar).await?;

    Ok((jar, Redirect::to(url.as_str())))
}

async fn callback(
    State(state): State<AuthState>,
    Path(provider): Path<String>,
    Query(query): Query<CallbackQuery>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), AuthError> {
    let (jar, identity) = state.oauth.complete(&provider, &query, jar).await?;

    let user = state
        .users
        .find_or_create_user(&user_from_identity(&identity))
        .await?;

    let pending = state.same_site.get(&jar).await?;
    let next = pending.get_str(NEXT_KEY).map(str::to_string);
    let jar = state.same_site.destroy(jar, &pending).await?;

    let mut session = state.cross_site.get(&jar).await?;
    session.set(USER_ID_KEY, user.id.to_string());
    let jar = state.cross_site.save(jar, &session).await?;

    tracing::info!(user_id = %user.id, provider = %provider, "User logged in");

    let target = match next.filter(|n| !n.is_empty()) {
        Some(encoded) => decode_return_url(&encoded)?,
        None => DEFAULT_LANDING_PATH.to_string(),
    };

    Ok((jar, Redirect::to(&target)))
}

async fn logout(
    State(state): State<AuthState>,
    jar: CookieJar,
) -> Result<CookieJar, AuthError> {
    let session = state.cross_site.get(&jar).await?;

    let jar = state.oauth.logout(jar).await?;
    let jar = state.cross_site.destroy(jar, &session).await?;

    Ok(jar)
}
