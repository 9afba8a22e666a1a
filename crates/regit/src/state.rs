//! Application state with repository-based storage.
//!
//! This module defines the shared application state that is passed to all
//! request handlers. It uses repository trait objects for storage abstraction
//! and supports different backend combinations via feature flags.

use std::sync::Arc;

use axum::extract::FromRef;
use regit_auth::{AuthConfig, AuthState};
use regit_core::auth::SessionRepository;
use regit_core::storage::{MessageRepository, UserRepository};

use crate::config::Config;

// ============================================================================
// Compile-time feature validation
// ============================================================================

// Session store features: exactly one must be enabled, they are mutually exclusive
#[cfg(all(feature = "auth-memory", feature = "auth-sqlite"))]
compile_error!("Cannot enable both 'auth-memory' and 'auth-sqlite' session features");

#[cfg(all(feature = "auth-memory", feature = "auth-redis"))]
compile_error!("Cannot enable both 'auth-memory' and 'auth-redis' session features");

#[cfg(all(feature = "auth-sqlite", feature = "auth-redis"))]
compile_error!("Cannot enable both 'auth-sqlite' and 'auth-redis' session features");

#[cfg(not(any(feature = "auth-memory", feature = "auth-sqlite", feature = "auth-redis")))]
compile_error!(
    "Must enable exactly one session feature: 'auth-memory', 'auth-sqlite', or 'auth-redis'"
);

/// Shared application state.
///
/// This is cloned for each request handler and contains shared resources
/// including repository trait objects for database access.
#[derive(Clone)]
pub struct AppState {
    pub messages: Arc<dyn MessageRepository>,
    /// Session scopes, providers and the user lookup used by `CurrentUser`.
    pub auth: AuthState,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

impl AppState {
    /// Creates the state from a repository that is already open.
    ///
    /// `auth` should resolve users through the same repository.
    pub fn build<R>(repo: Arc<R>, auth: AuthState) -> Self
    where
        R: UserRepository + MessageRepository + 'static,
    {
        Self {
            messages: repo,
            auth,
        }
    }

    /// Opens the data store and session store selected by cargo features.
    ///
    /// # Errors
    ///
    /// Returns an error if a store cannot be opened or a provider fails to
    /// initialize.
    pub async fn new(config: &Config, auth_config: &AuthConfig) -> Result<Self, anyhow::Error> {
        let repo = data_store::open(config).await?;
        let sessions = session_store::open(config, auth_config).await?;
        let auth = AuthState::from_config(sessions, repo.clone(), auth_config).await?;

        tracing::info!(
            providers = ?auth.oauth.providers().names().collect::<Vec<_>>(),
            "Auth initialized"
        );

        Ok(Self::build(repo, auth))
    }
}

// ============================================================================
// Data store
// ============================================================================

#[cfg(feature = "inmemory")]
mod data_store {
    use super::*;
    use crate::storage::InMemoryRepository;

    pub async fn open(_config: &Config) -> Result<Arc<InMemoryRepository>, anyhow::Error> {
        tracing::warn!("Using in-memory data store; users and messages are lost on restart");
        Ok(Arc::new(InMemoryRepository::new()))
    }
}

#[cfg(feature = "sqlite")]
mod data_store {
    use super::*;
    use crate::storage::SqliteRepository;

    pub async fn open(config: &Config) -> Result<Arc<SqliteRepository>, anyhow::Error> {
        tracing::info!(path = %config.database_url, "Opening SQLite data store");
        Ok(Arc::new(SqliteRepository::new(&config.database_url).await?))
    }
}

// ============================================================================
// Session store
// ============================================================================

#[cfg(feature = "auth-memory")]
mod session_store {
    use super::*;
    use regit_auth::InMemorySessionStore;

    pub async fn open(
        _config: &Config,
        auth_config: &AuthConfig,
    ) -> Result<Arc<dyn SessionRepository>, anyhow::Error> {
        Ok(Arc::new(InMemorySessionStore::new(auth_config.flow_ttl)))
    }
}

#[cfg(feature = "auth-sqlite")]
mod session_store {
    use super::*;
    use regit_auth::SqliteSessionStore;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

    pub async fn open(
        config: &Config,
        auth_config: &AuthConfig,
    ) -> Result<Arc<dyn SessionRepository>, anyhow::Error> {
        let options = SqliteConnectOptions::new()
            .filename(&config.database_url)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        let store = SqliteSessionStore::new(pool, auth_config.flow_ttl);
        store.migrate().await?;

        tracing::info!(path = %config.database_url, "Opened SQLite session store");
        Ok(Arc::new(store))
    }
}

#[cfg(feature = "auth-redis")]
mod session_store {
    use super::*;
    use fred::prelude::{Builder, ClientLike, Config as RedisConfig};
    use regit_auth::RedisSessionStore;

    pub async fn open(
        config: &Config,
        auth_config: &AuthConfig,
    ) -> Result<Arc<dyn SessionRepository>, anyhow::Error> {
        let redis_config = RedisConfig::from_url(&config.redis_url)?;
        let pool = Builder::from_config(redis_config).build_pool(4)?;
        pool.init().await?;

        tracing::info!(url = %config.redis_url, "Connected to Redis session store");
        Ok(Arc::new(RedisSessionStore::new(pool, auth_config.flow_ttl)))
    }
}

// ============================================================================
// Test support
// ============================================================================
