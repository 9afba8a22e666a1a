use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid OAuth state parameter")]
    InvalidState,

    #[error("no pending login for this state")]
    FlowNotFound,

    #[error("failed to exchange authorization code: {0}")]
    CodeExchange(String),

    #[error("provider returned an unusable identity: {0}")]
    InvalidIdentity(String),

    #[error("invalid return URL: {0}")]
    InvalidReturnUrl(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("provider error: {0}")]
    Provider(String),
}
