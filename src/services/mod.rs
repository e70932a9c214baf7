//! Services layer - Business logic
//!
//! Services own validation, slug and referential rules, and cache
//! invalidation. Repositories below them only store records.

pub mod blog_post;
pub mod cart;
pub mod category;
pub mod checkout;
pub mod contact;
pub mod error;
pub mod password;
pub mod product;
pub mod rate_limiter;
pub mod session;
pub mod slug;
pub mod user;

pub use blog_post::BlogPostService;
pub use cart::CartService;
pub use category::CategoryService;
pub use checkout::CheckoutService;
pub use contact::ContactService;
pub use error::{field_errors, FieldError, ServiceError};
pub use password::{hash_password, hash_password_blocking, verify_password, verify_password_blocking};
pub use product::ProductService;
pub use rate_limiter::LoginRateLimiter;
pub use session::{PurgeReport, ResolvedSession, SessionService};
pub use slug::{generate_slug, resolve_slug};
pub use user::UserService;
