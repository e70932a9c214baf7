//! User repository

use crate::db::memory::{MemoryTable, Record};
use crate::models::User;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<User>;

    async fn get_by_id(&self, id: i64) -> Result<Option<User>>;

    /// First user with this username
    async fn get_by_username(&self, username: &str) -> Result<Option<User>>;

    async fn list(&self) -> Result<Vec<User>>;

    async fn delete(&self, id: i64) -> Result<bool>;

    async fn exists_by_username(&self, username: &str) -> Result<bool>;
}

impl Record for User {
    fn id(&self) -> i64 {
        self.id
    }

    fn assign_id(&mut self, id: i64) {
        self.id = id;
    }
}

/// In-memory user repository
#[derive(Default)]
pub struct MemoryUserRepository {
    table: MemoryTable<User>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn boxed() -> Arc<dyn UserRepository> {
        Arc::new(Self::new())
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, user: &User) -> Result<User> {
        Ok(self.table.insert(user.clone()).await)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        Ok(self.table.get(id).await)
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self.table.find(|u| u.username == username).await)
    }

    async fn list(&self) -> Result<Vec<User>> {
        Ok(self.table.list().await)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        Ok(self.table.remove(id).await)
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool> {
        Ok(self.table.any(|u| u.username == username).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_by_username() {
        let repo = MemoryUserRepository::new();
        let created = repo
            .create(&User::new("admin", "hash", true))
            .await
            .expect("Failed to create user");
        assert_eq!(created.id, 1);
        assert_eq!(repo.get_by_username("admin").await.unwrap(), Some(created));
        assert!(repo.get_by_username("Admin").await.unwrap().is_none());
        assert!(repo.exists_by_username("admin").await.unwrap());
    }
}
