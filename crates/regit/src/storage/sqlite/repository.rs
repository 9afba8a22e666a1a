//! SQLite repository implementation.
//!
//! Implements the repository traits from `regit_core::storage` using SQLite.

use async_trait::async_trait;
use tokio_rusqlite::Connection;
use uuid::Uuid;

use regit_core::chat::{Message, User};
use regit_core::storage::{MessageRepository, RepositoryError, Result, UserRepository};

use super::conversions::{format_datetime, format_optional_datetime, row_to_message, row_to_user};
use super::error::{map_tokio_rusqlite_error, map_tokio_rusqlite_error_with_id};
use super::schema;

/// Helper to wrap rusqlite errors for tokio_rusqlite closures.
fn wrap_err(e: rusqlite::Error) -> tokio_rusqlite::Error {
    tokio_rusqlite::Error::Rusqlite(e)
}

/// Column values for `INSERT_USER` and `INSERT_USER_IF_ABSENT`, in order.
fn user_params(user: &User) -> [Option<String>; 9] {
    [
        Some(user.id.to_string()),
        Some(user.provider_user_id.clone()),
        Some(user.email.clone()),
        Some(user.first_name.clone()),
        Some(user.last_name.clone()),
        Some(user.nickname.clone()),
        Some(format_datetime(&user.created_at)),
        Some(format_datetime(&user.updated_at)),
        format_optional_datetime(&user.deleted_at),
    ]
}

/// SQLite-based repository implementation.
///
/// Provides async access to SQLite storage for users and messages.
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Creates a new repository with a file-based database.
    ///
    /// The database file will be created if it doesn't exist.
    /// Schema tables are created automatically.
    pub async fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Creates a new repository with an in-memory database.
    ///
    /// Useful for testing - data is lost when the connection is dropped.
    pub async fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    async fn init_schema(conn: &Connection) -> Result<()> {
        conn.call(|conn| {
            conn.execute_batch("PRAGMA foreign_keys = ON;")
                .map_err(wrap_err)?;
            conn.execute_batch(schema::CREATE_TABLES)
                .map_err(wrap_err)?;
            Ok(())
        })
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))
    }
}

#[async_trait]
impl UserRepository for SqliteRepository {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let id_str = id.to_string();

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(schema::SELECT_USER_BY_ID).map_err(wrap_err)?;
                match stmt.query_row([&id_str], row_to_user) {
                    Ok(user) => Ok(Some(user)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(wrap_err(e)),
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "User", id.to_string()))
    }

    async fn get_user_by_provider_id(&self, provider_user_id: &str) -> Result<Option<User>> {
        let provider_user_id = provider_user_id.to_string();
        let error_id = provider_user_id.clone();

        self.conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare(schema::SELECT_USER_BY_PROVIDER_ID)
                    .map_err(wrap_err)?;
                match stmt.query_row([&provider_user_id], row_to_user) {
                    Ok(user) => Ok(Some(user)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(wrap_err(e)),
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "User", error_id))
    }

    async fn create_user(&self, user: &User) -> Result<()> {
        let user = user.clone().ensure_id();
        let params = user_params(&user);

        self.conn
            .call(move |conn| {
                conn.execute(schema::INSERT_USER, rusqlite::params_from_iter(params))
                    .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "User", user.provider_user_id))
    }

    async fn find_or_create_user(&self, candidate: &User) -> Result<User> {
        let candidate = candidate.clone().ensure_id();
        let params = user_params(&candidate);
        let provider_user_id = candidate.provider_user_id.clone();
        let error_id = provider_user_id.clone();

        // The unique provider_user_id column settles concurrent first logins
        let (user, inserted) = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction().map_err(wrap_err)?;
                let inserted = tx
                    .execute(
                        schema::INSERT_USER_IF_ABSENT,
                        rusqlite::params_from_iter(params),
                    )
                    .map_err(wrap_err)?;
                let user = tx
                    .query_row(
                        schema::SELECT_USER_BY_PROVIDER_ID_ANY,
                        [&provider_user_id],
                        row_to_user,
                    )
                    .map_err(wrap_err)?;
                tx.commit().map_err(wrap_err)?;
                Ok((user, inserted > 0))
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "User", error_id))?;

        if inserted {
            tracing::debug!(user_id = %user.id, "Created user");
        }

        Ok(user)
    }
}

#[async_trait]
impl MessageRepository for SqliteRepository {
    async fn create_message(&self, message: &Message) -> Result<()> {
        let message_id = message.id.to_string();
        let params = [
            Some(message.id.to_string()),
            Some(message.user_id.to_string()),
            Some(message.message.clone()),
            Some(format_datetime(&message.created_at)),
            Some(format_datetime(&message.updated_at)),
            format_optional_datetime(&message.deleted_at),
        ];

        self.conn
            .call(move |conn| {
                conn.execute(schema::INSERT_MESSAGE, rusqlite::params_from_iter(params))
                    .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Message", message_id))
    }

    async fn list_messages(&self) -> Result<Vec<Message>> {
        self.conn
            .call(|conn| {
                let mut stmt = conn.prepare(schema::SELECT_MESSAGES).map_err(wrap_err)?;
                let rows = stmt.query_map([], row_to_message).map_err(wrap_err)?;

                let mut messages = Vec::new();
                for row_result in rows {
                    messages.push(row_result.map_err(wrap_err)?);
                }
                Ok(messages)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Message"))
    }
}
