//! Product repository
//!
//! This module provides:
//! - `ProductRepository` trait defining the interface for product data access
//! - `MemoryProductRepository` keeping products in a process-local table

use crate::db::memory::{MemoryTable, Record};
use crate::models::{Product, UpdateProductInput};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Product repository trait
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Create a new product; the returned copy carries the assigned ID
    async fn create(&self, product: &Product) -> Result<Product>;

    /// Get product by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Product>>;

    /// Get product by slug
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Product>>;

    /// List all products in insertion order
    async fn list(&self) -> Result<Vec<Product>>;

    /// Products of one category; an unknown category yields an empty list
    async fn list_by_category(&self, category_id: i64) -> Result<Vec<Product>>;

    async fn list_featured(&self) -> Result<Vec<Product>>;

    async fn list_new(&self) -> Result<Vec<Product>>;

    async fn count_by_category(&self, category_id: i64) -> Result<usize>;

    /// Shallow-merge `input` into the stored product
    async fn update(&self, id: i64, input: &UpdateProductInput) -> Result<Option<Product>>;

    /// Delete a product; false if it did not exist
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Check if a slug is taken by any product other than `excluding_id`
    async fn exists_by_slug(&self, slug: &str, excluding_id: Option<i64>) -> Result<bool>;

    async fn count(&self) -> Result<usize>;
}

impl Record for Product {
    fn id(&self) -> i64 {
        self.id
    }

    fn assign_id(&mut self, id: i64) {
        self.id = id;
    }
}

/// In-memory product repository
#[derive(Default)]
pub struct MemoryProductRepository {
    table: MemoryTable<Product>,
}

impl MemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed() -> Arc<dyn ProductRepository> {
        Arc::new(Self::new())
    }
}

#[async_trait]
impl ProductRepository for MemoryProductRepository {
    async fn create(&self, product: &Product) -> Result<Product> {
        Ok(self.table.insert(product.clone()).await)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Product>> {
        Ok(self.table.get(id).await)
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Product>> {
        Ok(self.table.find(|p| p.slug == slug).await)
    }

    async fn list(&self) -> Result<Vec<Product>> {
        Ok(self.table.list().await)
    }

    async fn list_by_category(&self, category_id: i64) -> Result<Vec<Product>> {
        Ok(self.table.filter(|p| p.category_id == category_id).await)
    }

    async fn list_featured(&self) -> Result<Vec<Product>> {
        Ok(self.table.filter(|p| p.featured).await)
    }

    async fn list_new(&self) -> Result<Vec<Product>> {
        Ok(self.table.filter(|p| p.is_new).await)
    }

    async fn count_by_category(&self, category_id: i64) -> Result<usize> {
        Ok(self.table.count(|p| p.category_id == category_id).await)
    }

    async fn update(&self, id: i64, input: &UpdateProductInput) -> Result<Option<Product>> {
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
    use crate::models::CreateProductInput;

    fn create_test_product(name: &str, category_id: i64) -> Product {
        let slug = name.to_lowercase().replace(' ', "-");
        CreateProductInput::new(name, 100_000, category_id).into_product(slug)
    }

    async fn setup_test_repo() -> MemoryProductRepository {
        let repo = MemoryProductRepository::new();
        let mut featured = create_test_product("Kem duong", 1);
        featured.featured = true;
        let mut fresh = create_test_product("Son moi", 2);
        fresh.is_new = true;
        for product in [featured, fresh, create_test_product("Serum", 1)] {
            repo.create(&product).await.expect("Failed to create product");
        }
        repo
    }

    #[tokio::test]
    async fn test_list_by_category() {
        let repo = setup_test_repo().await;
        let names: Vec<_> = repo
            .list_by_category(1)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Kem duong", "Serum"]);
    }

    #[tokio::test]
    async fn test_list_by_unknown_category_is_empty() {
        let repo = setup_test_repo().await;
        assert!(repo.list_by_category(999).await.unwrap().is_empty());
        assert_eq!(repo.count_by_category(999).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_featured_and_new() {
        let repo = setup_test_repo().await;
        let featured = repo.list_featured().await.unwrap();
        assert_eq!(featured.len(), 1);
        assert_eq!(featured[0].name, "Kem duong");

        let fresh = repo.list_new().await.unwrap();
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].name, "Son moi");
    }

    #[tokio::test]
    async fn test_update_partial() {
        let repo = setup_test_repo().await;
        let input = UpdateProductInput {
            stock: Some(7),
            sale_price: Some(Some(80_000)),
            ..Default::default()
        };
        let updated = repo.update(1, &input).await.unwrap().unwrap();
        assert_eq!(updated.stock, 7);
        assert_eq!(updated.sale_price, Some(80_000));
        assert_eq!(updated.name, "Kem duong");
        assert!(repo.update(999, &input).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_and_ids_not_reused() {
        let repo = setup_test_repo().await;
        assert!(repo.delete(3).await.unwrap());
        let created = repo.create(&create_test_product("Nuoc hoa", 4)).await.unwrap();
        assert_eq!(created.id, 4);
        assert_eq!(repo.count().await.unwrap(), 3);
    }
}
