//! Pure mapping from repository errors to HTTP status codes.
//!
//! Store failures are not classified as transient or permanent: everything
//! other than a missing row surfaces as a plain server error.

use super::RepositoryError;

/// Maps a [`RepositoryError`] to an HTTP status code.
///
/// - `NotFound` -> 404 (Not Found)
/// - every other variant -> 500 (Internal Server Error)
///
/// # Examples
///
/// ```
/// use regit_core::storage::{RepositoryError, repository_error_to_status_code};
///
/// let error = RepositoryError::QueryFailed("disk I/O error".to_string());
/// assert_eq!(repository_error_to_status_code(&error), 500);
/// ```
pub fn repository_error_to_status_code(error: &RepositoryError) -> u16 {
    match error {
        RepositoryError::NotFound { .. } => 404,
        RepositoryError::AlreadyExists { .. }
        | RepositoryError::ConnectionFailed(_)
        | RepositoryError::QueryFailed(_)
        | RepositoryError::Serialization(_)
        | RepositoryError::InvalidData(_) => 500,
    }
}
