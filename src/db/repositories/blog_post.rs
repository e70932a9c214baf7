//! Blog post repository

use crate::db::memory::{MemoryTable, Record};
use crate::models::{BlogPost, UpdateBlogPostInput};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Blog post repository trait
#[async_trait]
pub trait BlogPostRepository: Send + Sync {
    async fn create(&self, post: &BlogPost) -> Result<BlogPost>;

    async fn get_by_id(&self, id: i64) -> Result<Option<BlogPost>>;

    async fn get_by_slug(&self, slug: &str) -> Result<Option<BlogPost>>;

    /// List all posts in insertion order
    async fn list(&self) -> Result<Vec<BlogPost>>;

    async fn update(&self, id: i64, input: &UpdateBlogPostInput) -> Result<Option<BlogPost>>;

    async fn delete(&self, id: i64) -> Result<bool>;

    async fn exists_by_slug(&self, slug: &str, excluding_id: Option<i64>) -> Result<bool>;

    async fn count(&self) -> Result<usize>;
}

impl Record for BlogPost {
    fn id(&self) -> i64 {
        self.id
    }

    fn assign_id(&mut self, id: i64) {
        self.id = id;
    }
}

/// In-memory blog post repository
#[derive(Default)]
pub struct MemoryBlogPostRepository {
    table: MemoryTable<BlogPost>,
}

impl MemoryBlogPostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn boxed() -> Arc<dyn BlogPostRepository> {
        Arc::new(Self::new())
    }
}

#[async_trait]
impl BlogPostRepository for MemoryBlogPostRepository {
    async fn create(&self, post: &BlogPost) -> Result<BlogPost> {
        Ok(self.table.insert(post.clone()).await)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<BlogPost>> {
        Ok(self.table.get(id).await)
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<BlogPost>> {
        Ok(self.table.find(|p| p.slug == slug).await)
    }

    async fn list(&self) -> Result<Vec<BlogPost>> {
        Ok(self.table.list().await)
    }

    async fn update(&self, id: i64, input: &UpdateBlogPostInput) -> Result<Option<BlogPost>> {
        Ok(self.table.update(id, |p| input.apply_to(p)).await)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        Ok(self.table.remove(id).await)
    }

    async fn exists_by_slug(&self, slug: &str, excluding_id: Option<i64>) -> Result<bool> {
        Ok(self
            .table
            .any(|p| p.slug == slug && Some(p.id) != excluding_id)
            .await)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.table.len().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreateBlogPostInput;

    fn create_test_post(title: &str, slug: &str) -> BlogPost {
        CreateBlogPostInput::new(title, "Nội dung", "Chăm sóc da").into_post(slug.to_string())
    }

    #[tokio::test]
    async fn test_create_and_get_by_slug() {
        let repo = MemoryBlogPostRepository::new();
        let created = repo
            .create(&create_test_post("Bí quyết", "bi-quyet"))
            .await
            .expect("Failed to create post");
        assert_eq!(created.id, 1);
        assert_eq!(repo.get_by_slug("bi-quyet").await.unwrap(), Some(created));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let repo = MemoryBlogPostRepository::new();
        let created = repo.create(&create_test_post("A", "a")).await.unwrap();
        let input = UpdateBlogPostInput {
            title: Some("B".to_string()),
            ..Default::default()
        };
        let updated = repo.update(created.id, &input).await.unwrap().unwrap();
        assert_eq!(updated.title, "B");
        assert_eq!(updated.slug, "a");

        assert!(repo.delete(created.id).await.unwrap());
        assert!(repo.update(created.id, &input).await.unwrap().is_none());
    }
}
