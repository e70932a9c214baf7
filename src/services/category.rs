//! Category service
//!
//! Category CRUD with slug uniqueness, a read-through cache for the listing
//! and slug lookups, and a guard against deleting categories that still own
//! products.

use crate::cache::{CacheNamespace, CatalogCache};
use crate::db::repositories::{CategoryRepository, ProductRepository};
use crate::models::{Category, CreateCategoryInput, UpdateCategoryInput};
use anyhow::Context;
use std::sync::Arc;
use validator::Validate;

use super::slug::resolve_slug;
use super::ServiceError;

const CACHE_KEY_LIST: &str = "category:list";
const CACHE_KEY_BY_SLUG: &str = "category:slug:";

/// Category service
pub struct CategoryService {
    repo: Arc<dyn CategoryRepository>,
    products: Arc<dyn ProductRepository>,
    cache: Arc<CatalogCache>,
}

impl CategoryService {
    pub fn new(
        repo: Arc<dyn CategoryRepository>,
        products: Arc<dyn ProductRepository>,
        cache: Arc<CatalogCache>,
    ) -> Self {
        Self {
            repo,
            products,
            cache,
        }
    }

    /// All categories in insertion order
    pub async fn list(&self) -> Result<Vec<Category>, ServiceError> {
        Ok(self
            .cache
            .get_or_load(CacheNamespace::Categories, CACHE_KEY_LIST, || async {
                self.repo.list().await.context("Failed to list categories")
            })
            .await?)
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>, ServiceError> {
        let key = format!("{}{}", CACHE_KEY_BY_SLUG, slug);
        Ok(self
            .cache
            .get_or_load(CacheNamespace::Categories, &key, || async {
                self.repo
                    .get_by_slug(slug)
                    .await
                    .context("Failed to get category by slug")
            })
            .await?)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Category>, ServiceError> {
        Ok(self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get category")?)
    }

    /// Create a category. The slug is derived from the name when omitted.
    ///
    /// # Errors
    /// - `Validation` for bad fields or a slug already in use
    pub async fn create(&self, input: CreateCategoryInput) -> Result<Category, ServiceError> {
        input.validate()?;
        let slug = resolve_slug(input.slug.as_deref(), &input.name)?;
        self.ensure_slug_free(&slug, None).await?;

        let created = self
            .repo
            .create(&Category::new(input.name, slug, input.image_url))
            .await
            .context("Failed to create category")?;

        self.cache.invalidate(CacheNamespace::Categories);
        tracing::info!(id = created.id, slug = %created.slug, "Category created");
        Ok(created)
    }

    /// Shallow update. `Ok(None)` when the id is unknown.
    pub async fn update(
        &self,
        id: i64,
        input: UpdateCategoryInput,
    ) -> Result<Option<Category>, ServiceError> {
        input.validate()?;
        if let Some(slug) = &input.slug {
            self.ensure_slug_free(slug, Some(id)).await?;
        }

        let updated = self
            .repo
            .update(id, &input)
            .await
            .context("Failed to update category")?;

        if let Some(category) = &updated {
            self.cache.invalidate(CacheNamespace::Categories);
            tracing::info!(id = category.id, "Category updated");
        }
        Ok(updated)
    }

    /// Delete a category. `Ok(false)` when the id is unknown.
    ///
    /// # Errors
    /// - `Conflict` while any product still belongs to the category
    pub async fn delete(&self, id: i64) -> Result<bool, ServiceError> {
        let in_use = self
            .products
            .count_by_category(id)
            .await
            .context("Failed to count category products")?;
        if in_use > 0 {
            return Err(ServiceError::Conflict(format!(
                "Category {} still has {} product(s)",
                id, in_use
            )));
        }

        let deleted = self.repo.delete(id).await.context("Failed to delete category")?;
        if deleted {
            self.cache.invalidate(CacheNamespace::Categories);
            tracing::info!(id, "Category deleted");
        }
        Ok(deleted)
    }

    async fn ensure_slug_free(&self, slug: &str, excluding_id: Option<i64>) -> Result<(), ServiceError> {
        let taken = self
            .repo
            .exists_by_slug(slug, excluding_id)
            .await
            .context("Failed to check slug uniqueness")?;
        if taken {
            return Err(ServiceError::invalid(
                "slug",
                format!("Category slug already exists: {}", slug),
            ));
        }
        Ok(())
    }
}
