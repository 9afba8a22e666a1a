//! SQLite schema definitions and SQL query constants.
//!
//! This module contains all SQL statements used by the SQLite repository,
//! following the Functional Core pattern - pure data, no I/O.

/// SQL statement to create all tables.
pub const CREATE_TABLES: &str = r#"
-- Users table
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    provider_user_id TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    nickname TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    deleted_at TEXT
);

-- Messages table
CREATE TABLE IF NOT EXISTS messages (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    user_id TEXT NOT NULL,
    message TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    deleted_at TEXT,
    FOREIGN KEY (user_id) REFERENCES users(id)
);

CREATE INDEX IF NOT EXISTS idx_messages_user_id ON messages(user_id);
"#;

// User queries
pub const INSERT_USER: &str = r#"
INSERT INTO users (id, provider_user_id, email, first_name, last_name, nickname, created_at, updated_at, deleted_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
"#;

/// Inserts unless the provider identity is already known.
pub const INSERT_USER_IF_ABSENT: &str = r#"
INSERT INTO users (id, provider_user_id, email, first_name, last_name, nickname, created_at, updated_at, deleted_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
ON CONFLICT(provider_user_id) DO NOTHING
"#;

pub const SELECT_USER_BY_ID: &str = r#"
SELECT id, provider_user_id, email, first_name, last_name, nickname, created_at, updated_at, deleted_at
FROM users
WHERE id = ?1 AND deleted_at IS NULL
"#;

pub const SELECT_USER_BY_PROVIDER_ID: &str = r#"
SELECT id, provider_user_id, email, first_name, last_name, nickname, created_at, updated_at, deleted_at
FROM users
WHERE provider_user_id = ?1 AND deleted_at IS NULL
"#;

/// Used after `INSERT_USER_IF_ABSENT`, so it must see soft-deleted rows too.
pub const SELECT_USER_BY_PROVIDER_ID_ANY: &str = r#"
SELECT id, provider_user_id, email, first_name, last_name, nickname, created_at, updated_at, deleted_at
FROM users
WHERE provider_user_id = ?1
"#;

// Message queries
pub const INSERT_MESSAGE: &str = r#"
INSERT INTO messages (id, user_id, message, created_at, updated_at, deleted_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6)
"#;

pub const SELECT_MESSAGES: &str = r#"
SELECT id, user_id, message, created_at, updated_at, deleted_at
FROM messages
WHERE deleted_at IS NULL
ORDER BY seq ASC
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_tables_is_valid_sql() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch(CREATE_TABLES).unwrap();
    }

    #[test]
    fn test_create_tables_is_idempotent() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch(CREATE_TABLES).unwrap();
        conn.execute_batch(CREATE_TABLES).unwrap();
    }

    #[test]
    fn test_queries_prepare() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch(CREATE_TABLES).unwrap();

        for sql in [
            INSERT_USER,
            INSERT_USER_IF_ABSENT,
            SELECT_USER_BY_ID,
            SELECT_USER_BY_PROVIDER_ID,
            SELECT_USER_BY_PROVIDER_ID_ANY,
            INSERT_MESSAGE,
            SELECT_MESSAGES,
        ] {
            conn.prepare(sql).unwrap();
        }
    }
}
