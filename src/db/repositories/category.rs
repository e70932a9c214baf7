//! Category repository
//!
//! This module provides:
//! - `CategoryRepository` trait defining the interface for category data access
//! - `MemoryCategoryRepository` keeping categories in a process-local table

use crate::db::memory::{MemoryTable, Record};
use crate::models::{Category, UpdateCategoryInput};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Category repository trait
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Create a new category; the returned copy carries the assigned ID
    async fn create(&self, category: &Category) -> Result<Category>;

    /// Get category by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Category>>;

    /// Get category by slug
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>>;

    /// List all categories in insertion order
    async fn list(&self) -> Result<Vec<Category>>;

    /// Shallow-merge `input` into the stored category
    async fn update(&self, id: i64, input: &UpdateCategoryInput) -> Result<Option<Category>>;

    /// Delete a category; false if it did not exist
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Check if a slug is taken by any category other than `excluding_id`
    async fn exists_by_slug(&self, slug: &str, excluding_id: Option<i64>) -> Result<bool>;

    async fn count(&self) -> Result<usize>;
}

impl Record for Category {
    fn id(&self) -> i64 {
        self.id
    }

    fn assign_id(&mut self, id: i64) {
        self.id = id;
    }
}

/// In-memory category repository
#[derive(Default)]
pub struct MemoryCategoryRepository {
    table: MemoryTable<Category>,
}

impl MemoryCategoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed() -> Arc<dyn CategoryRepository> {
        Arc::new(Self::new())
    }
}

#[async_trait]
impl CategoryRepository for MemoryCategoryRepository {
    async fn create(&self, category: &Category) -> Result<Category> {
        Ok(self.table.insert(category.clone()).await)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Category>> {
        Ok(self.table.get(id).await)
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        Ok(self.table.find(|c| c.slug == slug).await)
    }

    async fn list(&self) -> Result<Vec<Category>> {
        Ok(self.table.list().await)
    }

    async fn update(&self, id: i64, input: &UpdateCategoryInput) -> Result<Option<Category>> {
        Ok(self.table.update(id, |c| input.apply_to(c)).await)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        Ok(self.table.remove(id).await)
    }

    async fn exists_by_slug(&self, slug: &str, excluding_id: Option<i64>) -> Result<bool> {
        Ok(self
            .table
            .any(|c| c.slug == slug && Some(c.id) != excluding_id)
            .await)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.table.len().await)
    }
}
