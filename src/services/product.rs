//! Product service
//!
//! Implements business logic for the catalog:
//! - Listing with the featured / new / category selector, name search,
//!   effective-price range and sorting
//! - Create and update with slug uniqueness and category checks
//! - Delete, cascading removal of the product's cart lines

use crate::cache::{CacheNamespace, CatalogCache};
use crate::db::repositories::{CartItemRepository, CategoryRepository, ProductRepository};
use crate::models::{CreateProductInput, Product, ProductQuery, UpdateProductInput};
use anyhow::Context;
use std::sync::Arc;
use validator::Validate;

use super::slug::resolve_slug;
use super::{FieldError, ServiceError};

const CACHE_KEY_BY_SLUG: &str = "product:slug:";

/// Base set picked by the listing query, before search/price/sort
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Selection {
    Featured,
    New,
    Category(i64),
    All,
}

impl Selection {
    /// `featured` wins over `new`, which wins over `categoryId`.
    fn from_query(query: &ProductQuery) -> Self {
        if query.featured_only() {
            Selection::Featured
        } else if query.new_only() {
            Selection::New
        } else if let Some(category_id) = query.category_id {
            Selection::Category(category_id)
        } else {
            Selection::All
        }
    }

    fn cache_key(self) -> String {
        match self {
            Selection::Featured => "product:featured".to_string(),
            Selection::New => "product:new".to_string(),
            Selection::Category(id) => format!("product:category:{}", id),
            Selection::All => "product:list".to_string(),
        }
    }
}

/// Product service
pub struct ProductService {
    repo: Arc<dyn ProductRepository>,
    categories: Arc<dyn CategoryRepository>,
    cart_items: Arc<dyn CartItemRepository>,
    cache: Arc<CatalogCache>,
}

impl ProductService {
    pub fn new(
        repo: Arc<dyn ProductRepository>,
        categories: Arc<dyn CategoryRepository>,
        cart_items: Arc<dyn CartItemRepository>,
        cache: Arc<CatalogCache>,
    ) -> Self {
        Self {
            repo,
            categories,
            cart_items,
            cache,
        }
    }

    /// List products matching `query`
    pub async fn list(&self, query: &ProductQuery) -> Result<Vec<Product>, ServiceError> {
        let selection = Selection::from_query(query);
        let mut products: Vec<Product> = self
            .cache
            .get_or_load(CacheNamespace::Products, &selection.cache_key(), || async {
                let products = match selection {
                    Selection::Featured => self.repo.list_featured().await,
                    Selection::New => self.repo.list_new().await,
                    Selection::Category(id) => self.repo.list_by_category(id).await,
                    Selection::All => self.repo.list().await,
                };
                products.context("Failed to list products")
            })
            .await?;

        products.retain(|product| query.matches(product));
        query.sort.apply(&mut products);
        Ok(products)
    }

    /// Products of one category; unknown ids give an empty list
    pub async fn list_by_category(&self, category_id: i64) -> Result<Vec<Product>, ServiceError> {
        self.list(&ProductQuery {
            category_id: Some(category_id),
            ..Default::default()
        })
        .await
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Product>, ServiceError> {
        let key = format!("{}{}", CACHE_KEY_BY_SLUG, slug);
        Ok(self
            .cache
            .get_or_load(CacheNamespace::Products, &key, || async {
                self.repo
                    .get_by_slug(slug)
                    .await
                    .context("Failed to get product by slug")
            })
            .await?)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Product>, ServiceError> {
        Ok(self.repo.get_by_id(id).await.context("Failed to get product")?)
    }

    /// Create a product. The slug is derived from the name when omitted.
    ///
    /// # Errors
    /// - `Validation` for bad fields, a sale price above the list price, an
    ///   unknown `categoryId`, or a slug already in use
    pub async fn create(&self, input: CreateProductInput) -> Result<Product, ServiceError> {
        input.validate()?;
        check_sale_price(input.price, input.sale_price)?;
        self.ensure_category_exists(input.category_id).await?;
        let slug = resolve_slug(input.slug.as_deref(), &input.name)?;
        self.ensure_slug_free(&slug, None).await?;

        let created = self
            .repo
            .create(&input.into_product(slug))
            .await
            .context("Failed to create product")?;

        self.cache.invalidate(CacheNamespace::Products);
        tracing::info!(id = created.id, slug = %created.slug, "Product created");
        Ok(created)
    }

    /// Shallow update. `Ok(None)` when the id is unknown.
    pub async fn update(
        &self,
        id: i64,
        input: UpdateProductInput,
    ) -> Result<Option<Product>, ServiceError> {
        input.validate()?;
        if let Some(Some(sale_price)) = input.sale_price {
            if sale_price < 0 {
                return Err(ServiceError::invalid(
                    "salePrice",
                    "Sale price must not be negative",
                ));
            }
        }

        let Some(mut merged) = self.get_by_id(id).await? else {
            return Ok(None);
        };
        input.apply_to(&mut merged);
        check_sale_price(merged.price, merged.sale_price)?;

        if let Some(category_id) = input.category_id {
            self.ensure_category_exists(category_id).await?;
        }
        if let Some(slug) = &input.slug {
            self.ensure_slug_free(slug, Some(id)).await?;
        }

        let updated = self
            .repo
            .update(id, &input)
            .await
            .context("Failed to update product")?;

        if updated.is_some() {
            self.cache.invalidate(CacheNamespace::Products);
            tracing::info!(id, "Product updated");
        }
        Ok(updated)
    }

    /// Delete a product and every cart line that references it.
    /// `Ok(false)` when the id is unknown.
    pub async fn delete(&self, id: i64) -> Result<bool, ServiceError> {
        let deleted = self.repo.delete(id).await.context("Failed to delete product")?;
        if !deleted {
            return Ok(false);
        }

        self.cache.invalidate(CacheNamespace::Products);
        let removed_lines = self
            .cart_items
            .delete_by_product(id)
            .await
            .context("Failed to remove cart lines of deleted product")?;
        tracing::info!(id, removed_lines, "Product deleted");
        Ok(true)
    }

    async fn ensure_category_exists(&self, category_id: i64) -> Result<(), ServiceError> {
        let exists = self
            .categories
            .get_by_id(category_id)
            .await
            .context("Failed to get category")?
            .is_some();
        if !exists {
            return Err(ServiceError::invalid(
                "categoryId",
                format!("Category not found: {}", category_id),
            ));
        }
        Ok(())
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
                format!("Product slug already exists: {}", slug),
            ));
        }
        Ok(())
    }
}

fn check_sale_price(price: i64, sale_price: Option<i64>) -> Result<(), ServiceError> {
    match sale_price {
        Some(sale) if sale > price => Err(ServiceError::Validation(vec![FieldError::new(
            "salePrice",
            "Sale price must not exceed the price",
        )])),
        _ => Ok(()),
    }
}
