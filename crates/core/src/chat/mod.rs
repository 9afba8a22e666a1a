mod requests;
mod types;
mod views;

pub use requests::CreateMessageRequest;
pub use types::{Message, User};
pub use views::{message_view, message_views, user_view, MessageResponse, UserResponse};
