//! OAuth login and cookie sessions for regit.
//!
//! This crate provides:
//! - The login, callback and logout routes
//! - OAuth providers (Google, plus a mock provider with the `mock` feature)
//! - Scoped session storage (in-memory, SQLite or Redis via feature flags)
//! - The `CurrentUser` extractor

mod config;
mod error;
mod extractors;
mod handlers;
mod oauth;
mod providers;
mod sessions;
mod state;
#[cfg(test)]
mod testing;

pub use config::{
    AuthConfig, ProviderConfig, GOOGLE_PROVIDER, NEXT_COOKIE, OAUTH_COOKIE, SESSION_COOKIE,
};
pub use error::AuthError;
pub use extractors::CurrentUser;
pub use handlers::auth_routes;
pub use oauth::{CallbackQuery, OAuthClient};
#[cfg(feature = "mock")]
pub use providers::{MockCode, MockProvider};
pub use providers::{GoogleProvider, ProviderRegistry};
pub use sessions::{InMemorySessionStore, ScopedSessions};
#[cfg(feature = "redis")]
pub use sessions::RedisSessionStore;
#[cfg(feature = "sqlite")]
pub use sessions::SqliteSessionStore;
pub use state::AuthState;

#[cfg(feature = "mock")]
pub mod mock_idp;
