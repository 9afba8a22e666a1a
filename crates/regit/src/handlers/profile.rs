use axum::Json;
use regit_auth::CurrentUser;
use regit_core::chat::{user_view, UserResponse};

/// Public profile of the logged-in user (GET /profile).
pub async fn get_profile(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(user_view(&user))
}
