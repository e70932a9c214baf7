//! Catalog cache
//!
//! Read-through cache for catalog reads (category, product and blog post
//! lists and slug lookups) backed by moka. Each entity kind has its own
//! namespace; any mutation of that kind drops the whole namespace, so a read
//! after a write always reaches the repository.
//!
//! Cart reads never go through this cache: cart lines are joined with live
//! product records.

use anyhow::{Context, Result};
use moka::future::Cache;
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::config::CacheConfig;

/// Cache entry wrapper that stores serialized JSON data
#[derive(Clone)]
struct CacheEntry {
    data: Arc<String>,
}

impl CacheEntry {
    fn new<T: Serialize>(value: &T) -> Result<Self> {
        let json = serde_json::to_string(value).context("Failed to serialize cache value")?;
        Ok(Self {
            data: Arc::new(json),
        })
    }

    fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.data).context("Failed to deserialize cache value")
    }
}

/// Cache namespace, one per catalog entity kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheNamespace {
    Categories,
    Products,
    BlogPosts,
}

/// Namespaced in-memory catalog cache
pub struct CatalogCache {
    enabled: bool,
    categories: Cache<String, CacheEntry>,
    products: Cache<String, CacheEntry>,
    blog_posts: Cache<String, CacheEntry>,
    /// Bumped on every invalidation, one counter per namespace
    generations: [AtomicU64; 3],
}

impl CatalogCache {
    pub fn new(config: &CacheConfig) -> Self {
        let build = || {
            Cache::builder()
                .max_capacity(config.max_capacity)
                .time_to_live(Duration::from_secs(config.ttl_seconds.max(1)))
                .build()
        };
        Self {
            enabled: config.enabled,
            categories: build(),
            products: build(),
            blog_posts: build(),
            generations: Default::default(),
        }
    }

    /// A cache that never stores anything
    pub fn disabled() -> Self {
        Self::new(&CacheConfig {
            enabled: false,
            ..CacheConfig::default()
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn store(&self, namespace: CacheNamespace) -> &Cache<String, CacheEntry> {
        match namespace {
            CacheNamespace::Categories => &self.categories,
            CacheNamespace::Products => &self.products,
            CacheNamespace::BlogPosts => &self.blog_posts,
        }
    }

    fn generation(&self, namespace: CacheNamespace) -> &AtomicU64 {
        &self.generations[namespace as usize]
    }

    /// Get a value; undecodable entries count as misses
    pub async fn get<T: DeserializeOwned>(&self, namespace: CacheNamespace, key: &str) -> Option<T> {
        if !self.enabled {
            return None;
        }
        let entry = self.store(namespace).get(key).await?;
        match entry.deserialize() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(?namespace, key, "Dropping unreadable cache entry: {:#}", e);
                self.store(namespace).invalidate(key).await;
                None
            }
        }
    }

    pub async fn set<T: Serialize>(&self, namespace: CacheNamespace, key: &str, value: &T) {
        if !self.enabled {
            return;
        }
        match CacheEntry::new(value) {
            Ok(entry) => self.store(namespace).insert(key.to_string(), entry).await,
            Err(e) => tracing::warn!(?namespace, key, "Skipping cache write: {:#}", e),
        }
    }

    /// Return the cached value for `key`, or run `load` and cache its result.
    /// Errors from `load` are returned and not cached, and neither is a value
    /// loaded while the namespace was invalidated.
    pub async fn get_or_load<T, F, Fut>(&self, namespace: CacheNamespace, key: &str, load: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(hit) = self.get(namespace, key).await {
            return Ok(hit);
        }
        let generation = self.generation(namespace).load(Ordering::Acquire);
        let value = load().await?;
        if self.is_current(namespace, generation) {
            self.set(namespace, key, &value).await;
            self.discard_if_stale(namespace, key, generation).await;
        }
        Ok(value)
    }

    fn is_current(&self, namespace: CacheNamespace, generation: u64) -> bool {
        self.generation(namespace).load(Ordering::Acquire) == generation
    }

    /// Drop `key` if the namespace moved past `generation`. An invalidation
    /// that bumped the generation before the insert landed may have cleared
    /// the store ahead of it.
    async fn discard_if_stale(&self, namespace: CacheNamespace, key: &str, generation: u64) {
        if !self.is_current(namespace, generation) {
            self.store(namespace).invalidate(key).await;
        }
    }

    /// Drop every entry of the namespace
    pub fn invalidate(&self, namespace: CacheNamespace) {
        self.generation(namespace).fetch_add(1, Ordering::AcqRel);
        self.store(namespace).invalidate_all();
        tracing::debug!(?namespace, "Cache namespace invalidated");
    }
}
