use async_trait::async_trait;
use uuid::Uuid;

use crate::chat::{Message, User};

use super::Result;

/// Repository for user operations.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Gets a user by their internal ID. Soft-deleted users are not returned.
    async fn get_user(&self, id: Uuid) -> Result<Option<User>>;

    /// Gets a user by the identifier their OAuth provider issued.
    async fn get_user_by_provider_id(&self, provider_user_id: &str) -> Result<Option<User>>;

    /// Creates a new user. Fails with `AlreadyExists` when the provider
    /// identifier is taken.
    async fn create_user(&self, user: &User) -> Result<()>;

    /// Returns the user owning `candidate.provider_user_id`, inserting
    /// `candidate` when there is none.
    ///
    /// An existing user is returned exactly as stored; none of its fields are
    /// refreshed from `candidate`. Implementations must make the lookup and
    /// the insert a single step so concurrent first logins converge on one row.
    async fn find_or_create_user(&self, candidate: &User) -> Result<User>;
}

/// Repository for the message log.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Appends a message.
    async fn create_message(&self, message: &Message) -> Result<()>;

    /// Lists every message in the store's natural order (oldest first for the
    /// bundled backends).
    async fn list_messages(&self) -> Result<Vec<Message>>;
}
