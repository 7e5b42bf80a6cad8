use std::sync::Arc;

use crate::error::{UserError, UserResult};
use crate::models::{CreateUser, UpdateUser, User, UserId};
use crate::repository::UserRepository;

/// Use-case layer between the HTTP handlers and the repository
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    pub async fn list_users(&self) -> UserResult<Vec<User>> {
        self.repository.list().await
    }

    pub async fn get_user(&self, id: UserId) -> UserResult<User> {
        self.repository.get_by_id(id).await
    }

    /// Creates a user; the store assigns the id
    pub async fn create_user(&self, input: CreateUser) -> UserResult<User> {
        self.repository.insert(input.into()).await
    }

    /// Replaces the user stored under `id`
    pub async fn update_user(&self, id: UserId, input: UpdateUser) -> UserResult<User> {
        self.repository.update(User::from_update(id, input)).await
    }

    /// Deletes a user. Unlike the repository, a missing id is `NotFound`.
    pub async fn delete_user(&self, id: UserId) -> UserResult<()> {
        if !self.repository.delete(id).await? {
            return Err(UserError::NotFound(id));
        }

        Ok(())
    }
}
