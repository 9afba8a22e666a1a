//! Session storage and cookie binding.
//!
//! Provides `SessionRepository` implementations for:
//! - In-memory (always available)
//! - SQLite (with `sqlite` feature)
//! - Redis (with `redis` feature)
//!
//! [`ScopedSessions`] ties a store to one cookie and one [`SessionScope`].

mod inmemory;
#[cfg(feature = "redis")]
mod redis_impl;
#[cfg(feature = "sqlite")]
mod sqlite;

use std::sync::Arc;

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use regit_core::auth::{
    calculate_expiry, generate_session_id, is_session_expired, Session, SessionId,
    SessionRepository, SessionScope,
};

use crate::config::{AuthConfig, NEXT_COOKIE, SESSION_COOKIE};
use crate::error::AuthError;

pub use inmemory::InMemorySessionStore;
#[cfg(feature = "redis")]
pub use redis_impl::RedisSessionStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteSessionStore;

/// Sessions of a single scope, addressed through a single cookie.
#[derive(Clone)]
pub struct ScopedSessions {
    repo: Arc<dyn SessionRepository>,
    scope: SessionScope,
    cookie_name: &'static str,
    same_site: SameSite,
    secure: bool,
    domain: Option<String>,
    ttl: chrono::Duration,
}

impl ScopedSessions {
    /// Long-lived authenticated sessions (`regit_session`, `SameSite=None`).
    pub fn cross_site(repo: Arc<dyn SessionRepository>, config: &AuthConfig) -> Self {
        Self {
            repo,
            scope: SessionScope::CrossSite,
            cookie_name: SESSION_COOKIE,
            same_site: SameSite::None,
            secure: config.cookie_secure,
            domain: config.cookie_domain.clone(),
            ttl: to_chrono(config.session_ttl),
        }
    }

    /// Short-lived sessions holding the return URL (`regit_next`, `SameSite=Lax`).
    pub fn same_site(repo: Arc<dyn SessionRepository>, config: &AuthConfig) -> Self {
        Self {
            repo,
            scope: SessionScope::SameSite,
            cookie_name: NEXT_COOKIE,
            same_site: SameSite::Lax,
            secure: config.cookie_secure,
            domain: None,
            ttl: to_chrono(config.flow_ttl),
        }
    }

    /// Session named by the request cookie, or a fresh unsaved one when the
    /// cookie is absent, unknown or expired.
    pub async fn get(&self, jar: &CookieJar) -> Result<Session, AuthError> {
        let now = Utc::now();

        if let Some(cookie) = jar.get(self.cookie_name) {
            let id = SessionId::new(cookie.value().to_string());
            if let Some(session) = self.repo.load_session(self.scope, &id).await? {
                if !is_session_expired(&session, now) {
                    return Ok(session);
                }
                tracing::debug!(scope = %self.scope, "Ignoring expired session");
            }
        }

        Ok(Session::new(
            generate_session_id(),
            self.scope,
            now,
            calculate_expiry(now, self.ttl),
        ))
    }

    /// Look up an existing session without creating one.
    pub async fn load(&self, jar: &CookieJar) -> Result<Option<Session>, AuthError> {
        let Some(cookie) = jar.get(self.cookie_name) else {
            return Ok(None);
        };

        let id = SessionId::new(cookie.value().to_string());
        let session = self.repo.load_session(self.scope, &id).await?;

        Ok(session.filter(|s| !is_session_expired(s, Utc::now())))
    }

    /// Persist the session and point the cookie at it.
    pub async fn save(&self, jar: CookieJar, session: &Session) -> Result<CookieJar, AuthError> {
        self.repo.save_session(session).await?;

        let max_age = (session.expires_at - Utc::now()).num_seconds().max(0);
        let mut cookie = Cookie::build((self.cookie_name, session.id.as_str().to_string()))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(self.same_site)
            .max_age(time::Duration::seconds(max_age));
        if let Some(domain) = &self.domain {
            cookie = cookie.domain(domain.clone());
        }

        Ok(jar.add(cookie))
    }

    /// Delete the session and expire its cookie.
    pub async fn destroy(&self, jar: CookieJar, session: &Session) -> Result<CookieJar, AuthError> {
        self.repo.delete_session(self.scope, &session.id).await?;
        Ok(jar.remove(self.removal_cookie()))
    }

    fn removal_cookie(&self) -> Cookie<'static> {
        let mut cookie = Cookie::build(self.cookie_name).path("/");
        if let Some(domain) = &self.domain {
            cookie = cookie.domain(domain.clone());
        }
        cookie.build()
    }
}

fn to_chrono(ttl: std::time::Duration) -> chrono::Duration {
    chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::days(7))
}
