//! Blog post service

use crate::cache::{CacheNamespace, CatalogCache};
use crate::db::repositories::BlogPostRepository;
use crate::models::{BlogPost, CreateBlogPostInput, UpdateBlogPostInput};
use anyhow::Context;
use std::sync::Arc;
use validator::Validate;

use super::slug::resolve_slug;
use super::ServiceError;

const CACHE_KEY_LIST: &str = "blog:list";
const CACHE_KEY_BY_SLUG: &str = "blog:slug:";

/// Blog post service
pub struct BlogPostService {
    repo: Arc<dyn BlogPostRepository>,
    cache: Arc<CatalogCache>,
}

impl BlogPostService {
    pub fn new(repo: Arc<dyn BlogPostRepository>, cache: Arc<CatalogCache>) -> Self {
        Self { repo, cache }
    }

    pub async fn list(&self) -> Result<Vec<BlogPost>, ServiceError> {
        Ok(self
            .cache
            .get_or_load(CacheNamespace::BlogPosts, CACHE_KEY_LIST, || async {
                self.repo.list().await.context("Failed to list blog posts")
            })
            .await?)
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<BlogPost>, ServiceError> {
        let key = format!("{}{}", CACHE_KEY_BY_SLUG, slug);
        Ok(self
            .cache
            .get_or_load(CacheNamespace::BlogPosts, &key, || async {
                self.repo
                    .get_by_slug(slug)
                    .await
                    .context("Failed to get blog post by slug")
            })
            .await?)
    }

    pub async fn create(&self, input: CreateBlogPostInput) -> Result<BlogPost, ServiceError> {
        input.validate()?;
        let slug = resolve_slug(input.slug.as_deref(), &input.title)?;
        self.ensure_slug_free(&slug, None).await?;

        let created = self
            .repo
            .create(&input.into_post(slug))
            .await
            .context("Failed to create blog post")?;

        self.cache.invalidate(CacheNamespace::BlogPosts);
        tracing::info!(id = created.id, slug = %created.slug, "Blog post created");
        Ok(created)
    }

    /// Shallow update. `Ok(None)` when the id is unknown.
    pub async fn update(
        &self,
        id: i64,
        input: UpdateBlogPostInput,
    ) -> Result<Option<BlogPost>, ServiceError> {
        input.validate()?;
        if let Some(slug) = &input.slug {
            self.ensure_slug_free(slug, Some(id)).await?;
        }

        let updated = self
            .repo
            .update(id, &input)
            .await
            .context("Failed to update blog post")?;
        if updated.is_some() {
            self.cache.invalidate(CacheNamespace::BlogPosts);
            tracing::info!(id, "Blog post updated");
        }
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> Result<bool, ServiceError> {
        let deleted = self.repo.delete(id).await.context("Failed to delete blog post")?;
        if deleted {
            self.cache.invalidate(CacheNamespace::BlogPosts);
            tracing::info!(id, "Blog post deleted");
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
                format!("Blog post slug already exists: {}", slug),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::MemoryBlogPostRepository;

    fn setup_service() -> BlogPostService {
        BlogPostService::new(
            MemoryBlogPostRepository::boxed(),
            Arc::new(CatalogCache::new(&Default::default())),
        )
    }

    #[tokio::test]
    async fn test_create_list_get() {
        let service = setup_service();
        let created = service
            .create(CreateBlogPostInput::new(
                "5 bước chăm sóc da",
                "Nội dung",
                "Chăm sóc da",
            ))
            .await
            .unwrap();
        assert_eq!(created.slug, "5-buoc-cham-soc-da");
        assert_eq!(service.list().await.unwrap(), vec![created.clone()]);
        assert_eq!(
            service.get_by_slug("5-buoc-cham-soc-da").await.unwrap(),
            Some(created)
        );
    }

    #[tokio::test]
    async fn test_slug_change_conflicts_with_other_post() {
        let service = setup_service();
        service
            .create(CreateBlogPostInput::new("A", "x", "c").with_slug("a"))
            .await
            .unwrap();
        let b = service
            .create(CreateBlogPostInput::new("B", "x", "c").with_slug("b"))
            .await
            .unwrap();

        let err = service
            .update(
                b.id,
                UpdateBlogPostInput {
                    slug: Some("a".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_delete_invalidates_slug_lookup() {
        let service = setup_service();
        let created = service
            .create(CreateBlogPostInput::new("A", "x", "c").with_slug("a"))
            .await
            .unwrap();
        assert!(service.get_by_slug("a").await.unwrap().is_some());

        assert!(service.delete(created.id).await.unwrap());
        assert!(service.get_by_slug("a").await.unwrap().is_none());
        assert!(!service.delete(created.id).await.unwrap());
    }
}
