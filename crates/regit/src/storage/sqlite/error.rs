//! SQLite error mapping.
//!
//! Maps `tokio_rusqlite::Error` and `rusqlite::Error` to `RepositoryError`
//! from `regit_core::storage`. Constraint violations become `AlreadyExists`
//! so a duplicate provider identity surfaces the same way on every backend.

use regit_core::storage::RepositoryError;
use rusqlite::ffi;

/// Maps a rusqlite error, filling in `id` where the caller knows it.
///
/// - `SQLITE_CONSTRAINT_UNIQUE` / `SQLITE_CONSTRAINT_PRIMARYKEY` → `AlreadyExists`
/// - `SQLITE_CONSTRAINT_FOREIGNKEY` → `InvalidData`
/// - `CannotOpen` → `ConnectionFailed`
/// - `QueryReturnedNoRows` → `NotFound`
/// - anything else → `QueryFailed`
fn map_rusqlite_error(
    err: &rusqlite::Error,
    entity_type: &'static str,
    id: Option<&str>,
) -> RepositoryError {
    let known_id = || id.unwrap_or("unknown").to_string();

    match err {
        rusqlite::Error::SqliteFailure(sqlite_err, _)
            if sqlite_err.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
                || sqlite_err.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
        {
            RepositoryError::AlreadyExists {
                entity_type,
                id: known_id(),
            }
        }

        rusqlite::Error::SqliteFailure(sqlite_err, _)
            if sqlite_err.extended_code == ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
        {
            RepositoryError::InvalidData(format!(
                "Foreign key constraint violation for {entity_type}"
            ))
        }

        rusqlite::Error::SqliteFailure(sqlite_err, _)
            if sqlite_err.code == rusqlite::ErrorCode::CannotOpen =>
        {
            RepositoryError::ConnectionFailed(format!("Cannot open database: {err}"))
        }

        rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
            entity_type,
            id: known_id(),
        },

        rusqlite::Error::FromSqlConversionFailure(..) => {
            RepositoryError::InvalidData(format!("Malformed {entity_type} row: {err}"))
        }

        _ => RepositoryError::QueryFailed(err.to_string()),
    }
}

fn map_inner(
    err: tokio_rusqlite::Error,
    entity_type: &'static str,
    id: Option<&str>,
) -> RepositoryError {
    match &err {
        tokio_rusqlite::Error::Rusqlite(rusqlite_err) => {
            map_rusqlite_error(rusqlite_err, entity_type, id)
        }
        tokio_rusqlite::Error::Close(_) => {
            RepositoryError::ConnectionFailed("Connection closed unexpectedly".to_string())
        }
        _ => RepositoryError::QueryFailed(err.to_string()),
    }
}

/// Maps a tokio_rusqlite error to a RepositoryError.
pub fn map_tokio_rusqlite_error(
    err: tokio_rusqlite::Error,
    entity_type: &'static str,
) -> RepositoryError {
    map_inner(err, entity_type, None)
}

/// Maps a tokio_rusqlite error with a known ID to a RepositoryError.
pub fn map_tokio_rusqlite_error_with_id(
    err: tokio_rusqlite::Error,
    entity_type: &'static str,
    id: impl Into<String>,
) -> RepositoryError {
    map_inner(err, entity_type, Some(&id.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constraint(extended_code: i32) -> tokio_rusqlite::Error {
        let sqlite_err = ffi::Error {
            code: rusqlite::ErrorCode::ConstraintViolation,
            extended_code,
        };
        tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(sqlite_err, None))
    }

    #[test]
    fn test_unique_constraint_maps_to_already_exists() {
        let result = map_tokio_rusqlite_error(constraint(ffi::SQLITE_CONSTRAINT_UNIQUE), "User");

        assert!(matches!(
            result,
            RepositoryError::AlreadyExists {
                entity_type: "User",
                ..
            }
        ));
    }

    #[test]
    fn test_unique_constraint_with_id_keeps_id() {
        let result = map_tokio_rusqlite_error_with_id(
            constraint(ffi::SQLITE_CONSTRAINT_UNIQUE),
            "User",
            "google-1",
        );

        match result {
            RepositoryError::AlreadyExists { id, .. } => assert_eq!(id, "google-1"),
            other => panic!("Expected AlreadyExists, got {other:?}"),
        }
    }

    #[test]
    fn test_foreign_key_maps_to_invalid_data() {
        let result =
            map_tokio_rusqlite_error(constraint(ffi::SQLITE_CONSTRAINT_FOREIGNKEY), "Message");

        assert!(matches!(result, RepositoryError::InvalidData(_)));
    }

    #[test]
    fn test_no_rows_maps_to_not_found() {
        let err = tokio_rusqlite::Error::Rusqlite(rusqlite::Error::QueryReturnedNoRows);

        let result = map_tokio_rusqlite_error_with_id(err, "User", "abc-123");

        match result {
            RepositoryError::NotFound { entity_type, id } => {
                assert_eq!(entity_type, "User");
                assert_eq!(id, "abc-123");
            }
            other => panic!("Expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_other_error_maps_to_query_failed() {
        let err = tokio_rusqlite::Error::Other(Box::new(std::io::Error::other("test error")));

        let result = map_tokio_rusqlite_error(err, "User");

        assert!(matches!(result, RepositoryError::QueryFailed(_)));
    }
}
