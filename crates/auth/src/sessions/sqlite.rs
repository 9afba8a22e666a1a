//! SQLite session storage implementation.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use regit_core::auth::{
    AuthError, AuthFlowState, Result, Session, SessionId, SessionRepository, SessionScope,
};
use sqlx::SqlitePool;

/// SQLite-backed session storage.
///
/// Expired sessions and stale login state are deleted on each write.
pub struct SqliteSessionStore {
    pool: SqlitePool,
    flow_ttl: chrono::Duration,
}

impl SqliteSessionStore {
    /// Creates a new SQLite session store.
    ///
    /// # Arguments
    ///
    /// * `pool` - SQLite connection pool
    /// * `flow_ttl` - How long pending login state is kept
    pub fn new(pool: SqlitePool, flow_ttl: Duration) -> Self {
        let flow_ttl = chrono::Duration::from_std(flow_ttl).unwrap_or(chrono::Duration::MAX);
        Self { pool, flow_ttl }
    }

    /// Runs database migrations to create required tables.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::raw_sql(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                id TEXT NOT NULL,
                scope TEXT NOT NULL,
                data TEXT NOT NULL,
                created_at TEXT NOT NULL,
                expires_at TEXT NOT NULL,
                PRIMARY KEY (scope, id)
            );
            CREATE INDEX IF NOT EXISTS idx_sessions_expires_at ON sessions(expires_at);

            CREATE TABLE IF NOT EXISTS auth_flows (
                state TEXT PRIMARY KEY,
                pkce_verifier TEXT NOT NULL,
                provider TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(())
    }
}

fn storage_err(e: impl std::fmt::Display) -> AuthError {
    AuthError::Storage(e.to_string())
}

// Fixed width and UTC so that stored values compare correctly as text
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)
        .map_err(storage_err)?
        .with_timezone(&Utc))
}

#[async_trait]
impl SessionRepository for SqliteSessionStore {
    async fn load_session(&self, scope: SessionScope, id: &SessionId) -> Result<Option<Session>> {
        let row = sqlx::query_as::<_, (String, String, String)>(
            "SELECT data, created_at, expires_at FROM sessions WHERE scope = ? AND id = ?",
        )
        .bind(scope.as_str())
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;

        match row {
            Some((data, created_at, expires_at)) => Ok(Some(Session {
                id: id.clone(),
                scope,
                values: serde_json::from_str(&data).map_err(storage_err)?,
                created_at: parse_timestamp(&created_at)?,
                expires_at: parse_timestamp(&expires_at)?,
            })),
            None => Ok(None),
        }
    }

    async fn save_session(&self, session: &Session) -> Result<()> {
        let data = serde_json::to_string(&session.values).map_err(storage_err)?;

        sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(timestamp(Utc::now()))
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;

        sqlx::query(
            "INSERT OR REPLACE INTO sessions (id, scope, data, created_at, expires_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(session.id.as_str())
        .bind(session.scope.as_str())
        .bind(data)
        .bind(timestamp(session.created_at))
        .bind(timestamp(session.expires_at))
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(())
    }

    async fn delete_session(&self, scope: SessionScope, id: &SessionId) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE scope = ? AND id = ?")
            .bind(scope.as_str())
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;

        Ok(())
    }

    async fn store_auth_flow(&self, state: &str, flow: &AuthFlowState) -> Result<()> {
        let cutoff = Utc::now()
            .checked_sub_signed(self.flow_ttl)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        sqlx::query("DELETE FROM auth_flows WHERE created_at <= ?")
            .bind(timestamp(cutoff))
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;

        sqlx::query(
            "INSERT OR REPLACE INTO auth_flows (state, pkce_verifier, provider, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(state)
        .bind(&flow.pkce_verifier)
        .bind(&flow.provider)
        .bind(timestamp(flow.created_at))
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(())
    }

    async fn take_auth_flow(&self, state: &str) -> Result<Option<AuthFlowState>> {
        // SELECT and DELETE in one transaction so a state is only ever used once
        let mut tx = self.pool.begin().await.map_err(storage_err)?;

        let row = sqlx::query_as::<_, (String, String, String)>(
            "SELECT pkce_verifier, provider, created_at FROM auth_flows WHERE state = ?",
        )
        .bind(state)
        .fetch_optional(&mut *tx)
        .await
        .map_err(storage_err)?;

        if row.is_some() {
            sqlx::query("DELETE FROM auth_flows WHERE state = ?")
                .bind(state)
                .execute(&mut *tx)
                .await
                .map_err(storage_err)?;
        }

        tx.commit().await.map_err(storage_err)?;

        match row {
            Some((pkce_verifier, provider, created_at)) => Ok(Some(AuthFlowState {
                pkce_verifier,
                provider,
                created_at: parse_timestamp(&created_at)?,
            })),
            None => Ok(None),
        }
    }
}
