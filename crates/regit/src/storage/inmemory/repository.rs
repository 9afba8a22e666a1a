//! In-memory repository implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use regit_core::chat::{Message, User};
use regit_core::storage::{MessageRepository, RepositoryError, Result, UserRepository};

/// In-memory storage backend.
///
/// Messages keep insertion order, which is the order `list_messages` returns.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
    messages: Arc<RwLock<Vec<Message>>>,
}

impl InMemoryRepository {
    /// Creates a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }
}

fn find_by_provider_id<'a>(
    users: &'a HashMap<Uuid, User>,
    provider_user_id: &str,
) -> Option<&'a User> {
    users
        .values()
        .find(|u| u.provider_user_id == provider_user_id && !u.is_deleted())
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).filter(|u| !u.is_deleted()).cloned())
    }

    async fn get_user_by_provider_id(&self, provider_user_id: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(find_by_provider_id(&users, provider_user_id).cloned())
    }

    async fn create_user(&self, user: &User) -> Result<()> {
        let user = user.clone().ensure_id();
        let mut users = self.users.write().await;

        if users.contains_key(&user.id) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "User",
                id: user.id.to_string(),
            });
        }
        if users
            .values()
            .any(|u| u.provider_user_id == user.provider_user_id)
        {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "User",
                id: user.provider_user_id.clone(),
            });
        }

        users.insert(user.id, user);
        Ok(())
    }

    async fn find_or_create_user(&self, candidate: &User) -> Result<User> {
        // One write lock covers the lookup and the insert
        let mut users = self.users.write().await;

        if let Some(existing) = users
            .values()
            .find(|u| u.provider_user_id == candidate.provider_user_id)
        {
            return Ok(existing.clone());
        }

        let user = candidate.clone().ensure_id();
        users.insert(user.id, user.clone());
        tracing::debug!(user_id = %user.id, "Created user");
        Ok(user)
    }
}

#[async_trait]
impl MessageRepository for InMemoryRepository {
    async fn create_message(&self, message: &Message) -> Result<()> {
        let mut messages = self.messages.write().await;
        if messages.iter().any(|m| m.id == message.id) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "Message",
                id: message.id.to_string(),
            });
        }
        messages.push(message.clone());
        Ok(())
    }

    async fn list_messages(&self) -> Result<Vec<Message>> {
        let messages = self.messages.read().await;
        Ok(messages.iter().filter(|m| !m.is_deleted()).cloned().collect())
    }
}
