//! Repositories
//!
//! One repository per entity. Each is a trait so the in-memory backing can be
//! swapped for a durable one without touching the services.

pub mod blog_post;
pub mod cart_item;
pub mod category;
pub mod product;
pub mod session;
pub mod user;

pub use blog_post::{BlogPostRepository, MemoryBlogPostRepository};
pub use cart_item::{CartItemRepository, CartMerge, MemoryCartItemRepository};
pub use category::{CategoryRepository, MemoryCategoryRepository};
pub use product::{MemoryProductRepository, ProductRepository};
pub use session::{MemorySessionRepository, SessionRepository};
pub use user::{MemoryUserRepository, UserRepository};
