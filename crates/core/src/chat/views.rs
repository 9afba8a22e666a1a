//! Public views of domain entities.
//!
//! Entities stay free of presentation concerns; handlers map them through
//! these pure functions right before serialising a response.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Message, User};

/// Public profile returned by `GET /profile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
}

/// Public shape of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub id: Uuid,
    pub message: String,
}

/// The profile view exposes the nickname as `name`.
pub fn user_view(user: &User) -> UserResponse {
    UserResponse {
        id: user.id,
        name: user.nickname.clone(),
    }
}

pub fn message_view(message: &Message) -> MessageResponse {
    MessageResponse {
        id: message.id,
        message: message.message.clone(),
    }
}

pub fn message_views(messages: &[Message]) -> Vec<MessageResponse> {
    messages.iter().map(message_view).collect()
}
