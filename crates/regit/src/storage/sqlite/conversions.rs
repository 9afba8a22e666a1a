//! SQLite row conversion functions.
//!
//! Pure functions for converting between SQLite rows and domain types.
//! These are testable in isolation without database access.

use chrono::{DateTime, Utc};
use regit_core::chat::{Message, User};
use rusqlite::Row;
use uuid::Uuid;

/// Convert a SQLite row to a User.
///
/// Expected columns: id, provider_user_id, email, first_name, last_name,
/// nickname, created_at, updated_at, deleted_at
pub fn row_to_user(row: &Row) -> rusqlite::Result<User> {
    let id: String = row.get(0)?;
    let created_at: String = row.get(6)?;
    let updated_at: String = row.get(7)?;
    let deleted_at: Option<String> = row.get(8)?;

    Ok(User {
        id: parse_uuid(&id)?,
        provider_user_id: row.get(1)?,
        email: row.get(2)?,
        first_name: row.get(3)?,
        last_name: row.get(4)?,
        nickname: row.get(5)?,
        created_at: parse_datetime(&created_at)?,
        updated_at: parse_datetime(&updated_at)?,
        deleted_at: deleted_at.as_deref().map(parse_datetime).transpose()?,
    })
}

/// Convert a SQLite row to a Message.
///
/// Expected columns: id, user_id, message, created_at, updated_at, deleted_at
pub fn row_to_message(row: &Row) -> rusqlite::Result<Message> {
    let id: String = row.get(0)?;
    let user_id: String = row.get(1)?;
    let created_at: String = row.get(3)?;
    let updated_at: String = row.get(4)?;
    let deleted_at: Option<String> = row.get(5)?;

    Ok(Message {
        id: parse_uuid(&id)?,
        user_id: parse_uuid(&user_id)?,
        message: row.get(2)?,
        created_at: parse_datetime(&created_at)?,
        updated_at: parse_datetime(&updated_at)?,
        deleted_at: deleted_at.as_deref().map(parse_datetime).transpose()?,
    })
}

fn parse_uuid(s: &str) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn parse_datetime(s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })
}

pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

pub fn format_optional_datetime(dt: &Option<DateTime<Utc>>) -> Option<String> {
    dt.as_ref().map(format_datetime)
}
