//! Storage layer
//!
//! All state is process-local and lives for the lifetime of the server.
//! [`Repositories`] bundles one instance of every repository so the
//! application wiring and the tests build the same graph.

pub mod memory;
pub mod repositories;
pub mod seed;

use repositories::{
    BlogPostRepository, CartItemRepository, CategoryRepository, MemoryBlogPostRepository,
    MemoryCartItemRepository, MemoryCategoryRepository, MemoryProductRepository,
    MemorySessionRepository, MemoryUserRepository, ProductRepository, SessionRepository,
    UserRepository,
};
use std::sync::Arc;

/// Shared handles to every repository
#[derive(Clone)]
pub struct Repositories {
    pub categories: Arc<dyn CategoryRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub blog_posts: Arc<dyn BlogPostRepository>,
    pub users: Arc<dyn UserRepository>,
    pub cart_items: Arc<dyn CartItemRepository>,
    pub sessions: Arc<dyn SessionRepository>,
}

impl Repositories {
    /// Fresh, empty in-memory repositories
    pub fn in_memory() -> Self {
        Self {
            categories: MemoryCategoryRepository::boxed(),
            products: MemoryProductRepository::boxed(),
            blog_posts: MemoryBlogPostRepository::boxed(),
            users: MemoryUserRepository::boxed(),
            cart_items: MemoryCartItemRepository::boxed(),
            sessions: MemorySessionRepository::boxed(),
        }
    }
}
