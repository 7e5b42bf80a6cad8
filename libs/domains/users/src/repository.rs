use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{UserError, UserResult};
use crate::models::{User, UserId};

/// Repository trait for User persistence
///
/// Every call is atomic on its own; sequences of calls are not.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Snapshot of all users
    async fn list(&self) -> UserResult<Vec<User>>;

    /// Get a user by ID, `NotFound` if absent
    async fn get_by_id(&self, id: UserId) -> UserResult<User>;

    /// Store `user` under a fresh id (`max + 1`, or 1 when empty).
    /// The id carried by `user` is ignored.
    async fn insert(&self, user: User) -> UserResult<User>;

    /// Replace the record stored under `user.id`, `NotFound` if absent
    async fn update(&self, user: User) -> UserResult<User>;

    /// Remove a user. Returns whether a record was removed.
    async fn delete(&self, id: UserId) -> UserResult<bool>;
}

/// In-memory implementation of UserRepository
///
/// Clones share the same underlying map.
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<BTreeMap<UserId, User>>>,
}

impl InMemoryUserRepository {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store preloaded with the three startup users
    pub fn seeded() -> Self {
        Self::with_users([
            User::new(1, "John", "Doe"),
            User::new(2, "Jane", "Doe"),
            User::new(3, "Alice", "Smith"),
        ])
    }

    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let users = users.into_iter().map(|u| (u.id, u)).collect();
        Self {
            users: Arc::new(RwLock::new(users)),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn list(&self) -> UserResult<Vec<User>> {
        let users = self.users.read().await;
        Ok(users.values().cloned().collect())
    }

    async fn get_by_id(&self, id: UserId) -> UserResult<User> {
        let users = self.users.read().await;
        users.get(&id).cloned().ok_or(UserError::NotFound(id))
    }

    async fn insert(&self, user: User) -> UserResult<User> {
        // Id computation and store happen under one write guard.
        let mut users = self.users.write().await;

        let max_id = users.last_key_value().map_or(0, |(id, _)| *id);
        let id = max_id
            .checked_add(1)
            .ok_or_else(|| UserError::Internal("user id space exhausted".to_string()))?;

        let user = User { id, ..user };
        users.insert(id, user.clone());

        tracing::info!(user_id = id, "Created user");
        Ok(user)
    }

    async fn update(&self, user: User) -> UserResult<User> {
        let mut users = self.users.write().await;

        let Some(slot) = users.get_mut(&user.id) else {
            return Err(UserError::NotFound(user.id));
        };
        *slot = user.clone();

        tracing::info!(user_id = user.id, "Updated user");
        Ok(user)
    }

    async fn delete(&self, id: UserId) -> UserResult<bool> {
        let mut users = self.users.write().await;

        if users.remove(&id).is_some() {
            tracing::info!(user_id = id, "Deleted user");
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seeded_contents() {
        let repo = InMemoryUserRepository::seeded();

        let users = repo.list().await.unwrap();
        assert_eq!(
            users,
            vec![
                User::new(1, "John", "Doe"),
                User::new(2, "Jane", "Doe"),
                User::new(3, "Alice", "Smith"),
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_store() {
        let repo = InMemoryUserRepository::new();

        assert!(repo.list().await.unwrap().is_empty());
        assert!(matches!(
            repo.get_by_id(1).await,
            Err(UserError::NotFound(1))
        ));
    }

    #[tokio::test]
    async fn test_insert_into_empty_store_starts_at_one() {
        let repo = InMemoryUserRepository::new();

        let created = repo.insert(User::new(0, "A", "B")).await.unwrap();
        assert_eq!(created.id, 1);
    }

    #[tokio::test]
    async fn test_insert_ignores_caller_id() {
        let repo = InMemoryUserRepository::seeded();

        let created = repo.insert(User::new(77, "X", "Y")).await.unwrap();
        assert_eq!(created, User::new(4, "X", "Y"));
        assert!(matches!(repo.get_by_id(77).await, Err(UserError::NotFound(77))));
    }

    #[tokio::test]
    async fn test_insert_uses_max_not_count() {
        let repo = InMemoryUserRepository::seeded();
        assert!(repo.delete(2).await.unwrap());

        let created = repo.insert(User::new(0, "New", "User")).await.unwrap();
        assert_eq!(created.id, 4);
    }

    #[tokio::test]
    async fn test_insert_reuses_id_after_deleting_max() {
        let repo = InMemoryUserRepository::seeded();
        assert!(repo.delete(3).await.unwrap());

        let created = repo.insert(User::new(0, "New", "User")).await.unwrap();
        assert_eq!(created.id, 3);
    }

    #[tokio::test]
    async fn test_insert_reports_exhausted_id_space() {
        let repo = InMemoryUserRepository::with_users([User::new(UserId::MAX, "Last", "One")]);

        let result = repo.insert(User::new(0, "A", "B")).await;
        assert!(matches!(result, Err(UserError::Internal(_))));
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_after_insert_returns_equal_record() {
        let repo = InMemoryUserRepository::seeded();

        let created = repo.insert(User::new(0, "John2", "Doe2")).await.unwrap();
        let fetched = repo.get_by_id(created.id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_get_missing_on_seeded_store() {
        let repo = InMemoryUserRepository::seeded();

        assert!(matches!(
            repo.get_by_id(999).await,
            Err(UserError::NotFound(999))
        ));
    }

    #[tokio::test]
    async fn test_update_missing_leaves_store_unchanged() {
        let repo = InMemoryUserRepository::seeded();
        let before = repo.list().await.unwrap();

        let result = repo.update(User::new(999, "Ghost", "User")).await;
        assert!(matches!(result, Err(UserError::NotFound(999))));
        assert_eq!(repo.list().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_update_overwrites_record() {
        let repo = InMemoryUserRepository::seeded();

        let updated = repo.update(User::new(2, "Janet", "Smith")).await.unwrap();
        assert_eq!(updated, User::new(2, "Janet", "Smith"));
        assert_eq!(repo.get_by_id(2).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let repo = InMemoryUserRepository::seeded();

        assert!(repo.delete(1).await.unwrap());
        assert!(!repo.delete(1).await.unwrap());
        assert!(!repo.delete(999).await.unwrap());
        assert_eq!(repo.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_full_lifecycle() {
        let repo = InMemoryUserRepository::seeded();

        let created = repo.insert(User::new(0, "John2", "Doe2")).await.unwrap();
        assert_eq!(created, User::new(4, "John2", "Doe2"));

        let updated = repo.update(User::new(4, "John3", "Doe3")).await.unwrap();
        assert_eq!(updated, User::new(4, "John3", "Doe3"));

        assert!(repo.delete(4).await.unwrap());
        assert!(matches!(repo.get_by_id(4).await, Err(UserError::NotFound(4))));
    }

    #[tokio::test]
    async fn test_list_returns_snapshot() {
        let repo = InMemoryUserRepository::seeded();

        let mut snapshot = repo.list().await.unwrap();
        snapshot[0].name = "Mutated".to_string();

        assert_eq!(repo.get_by_id(1).await.unwrap().name, "John");
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let repo = InMemoryUserRepository::new();
        let other = repo.clone();

        repo.insert(User::new(0, "A", "B")).await.unwrap();
        assert_eq!(other.list().await.unwrap().len(), 1);
    }
}
