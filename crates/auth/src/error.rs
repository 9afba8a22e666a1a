use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Auth errors for the regit_auth crate.
///
/// This wraps the core `AuthError` and adds crate-specific error variants
/// for I/O operations that can't be in the functional core.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Error from the core auth module (state checks, code exchange, storage, etc.)
    #[error(transparent)]
    Core(#[from] regit_core::auth::AuthError),

    /// HTTP client error during the OAuth flow
    #[error("HTTP error: {0}")]
    Http(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Provider not configured
    #[error("provider not configured: {0}")]
    ProviderNotConfigured(String),

    /// The provider redirected back with an `error` instead of a code.
    #[error("provider rejected login: {0}")]
    ProviderRejected(String),

    /// The request carries no usable authenticated session.
    #[error("forbidden")]
    Forbidden,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        use regit_core::auth::AuthError as CoreError;

        let (status, message) = match &self {
            AuthError::Core(core_err) => match core_err {
                CoreError::InvalidState | CoreError::FlowNotFound => {
                    (StatusCode::BAD_REQUEST, self.to_string())
                }
                CoreError::InvalidReturnUrl(_) => {
                    (StatusCode::BAD_REQUEST, "Invalid return URL".to_string())
                }
                CoreError::CodeExchange(_)
                | CoreError::InvalidIdentity(_)
                | CoreError::Storage(_)
                | CoreError::Provider(_) => {
                    tracing::error!("Auth error: {}", self);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal server error".to_string(),
                    )
                }
            },
            AuthError::Http(_) => {
                tracing::error!("HTTP error during auth: {}", self);
                (
                    StatusCode::BAD_GATEWAY,
                    "Authentication provider error".to_string(),
                )
            }
            AuthError::Config(_) => {
                tracing::error!("Config error: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server configuration error".to_string(),
                )
            }
            AuthError::ProviderNotConfigured(provider) => (
                StatusCode::NOT_FOUND,
                format!("Authentication provider '{}' is not configured", provider),
            ),
            AuthError::ProviderRejected(reason) => {
                tracing::warn!(reason = %reason, "Provider rejected login");
                (StatusCode::BAD_REQUEST, "Login was not completed".to_string())
            }
            AuthError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden".to_string()),
        };

        (status, message).into_response()
    }
}

impl From<regit_core::storage::RepositoryError> for AuthError {
    fn from(err: regit_core::storage::RepositoryError) -> Self {
        AuthError::Core(regit_core::auth::AuthError::Storage(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regit_core::auth::AuthError as CoreError;

    #[test]
    fn forbidden_maps_to_403() {
        let response = AuthError::Forbidden.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn state_errors_map_to_400() {
        for err in [CoreError::InvalidState, CoreError::FlowNotFound] {
            let response = AuthError::Core(err).into_response();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn bad_return_url_maps_to_400() {
        let err = AuthError::Core(CoreError::InvalidReturnUrl("bad".to_string()));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn storage_errors_map_to_500() {
        let err = AuthError::Core(CoreError::Storage("disk full".to_string()));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn unknown_provider_maps_to_404() {
        let err = AuthError::ProviderNotConfigured("github".to_string());
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn repository_errors_become_storage_errors() {
        let err: AuthError =
            regit_core::storage::RepositoryError::QueryFailed("boom".to_string()).into();
        assert!(matches!(err, AuthError::Core(CoreError::Storage(_))));
    }
}
