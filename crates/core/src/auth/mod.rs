mod error;
mod functions;
mod traits;
mod types;

pub use error::AuthError;
pub use functions::{
    calculate_expiry, decode_return_url, generate_session_id, generate_state, is_flow_expired,
    is_session_expired, resolve_user_id, user_from_identity,
};
pub use traits::{OAuthProviderClient, Result, SessionRepository};
pub use types::{
    AuthFlowState, ProviderIdentity, Session, SessionId, SessionScope, DEFAULT_LANDING_PATH,
    NEXT_KEY, USER_ID_KEY,
};
