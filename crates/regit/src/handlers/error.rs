use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use regit_core::storage::{repository_error_to_status_code, RepositoryError};

/// Application error type that wraps `anyhow::Error`.
///
/// Repository errors keep their mapped status code. The cause is logged here
/// and never sent to the client.
pub struct AppError(pub anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status_code = match self.0.downcast_ref::<RepositoryError>() {
            Some(repo_error) => StatusCode::from_u16(repository_error_to_status_code(repo_error))
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            None => StatusCode::INTERNAL_SERVER_ERROR,
        };

        tracing::error!(error = %self.0, status = %status_code, "Request failed");

        let body = status_code
            .canonical_reason()
            .unwrap_or("Internal Server Error");

        (status_code, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
