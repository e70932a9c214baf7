//! Data models
//!
//! Entities stored by the repositories plus the request payloads that create
//! and update them.

pub mod blog_post;
pub mod cart_item;
pub mod category;
pub mod checkout;
pub mod contact;
pub mod product;
pub mod session;
pub mod user;

pub use blog_post::{BlogPost, CreateBlogPostInput, UpdateBlogPostInput};
pub use cart_item::{AddCartItemInput, CartItem, CartLine, CartSummary, UpdateCartItemInput};
pub use category::{Category, CreateCategoryInput, UpdateCategoryInput};
pub use checkout::{CheckoutInput, OrderConfirmation, PaymentMethod};
pub use contact::{ContactInput, ContactMessage, NewsletterInput};
pub use product::{CreateProductInput, Product, ProductQuery, ProductSort, UpdateProductInput};
pub use session::Session;
pub use user::{LoginInput, User};

use std::borrow::Cow;
use validator::ValidationError;

/// Check that a slug is lowercase ASCII words joined by single hyphens.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= 200
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

pub(crate) fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    if is_valid_slug(slug) {
        return Ok(());
    }
    let mut error = ValidationError::new("slug");
    error.message = Some(Cow::from(
        "Slug must contain only lowercase letters, digits and single hyphens",
    ));
    Err(error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_slugs() {
        assert!(is_valid_slug("cham-soc-da"));
        assert!(is_valid_slug("serum-vitamin-c"));
        assert!(is_valid_slug("top10"));
    }

    #[test]
    fn test_invalid_slugs() {
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("-leading"));
        assert!(!is_valid_slug("trailing-"));
        assert!(!is_valid_slug("double--hyphen"));
        assert!(!is_valid_slug("Upper"));
        assert!(!is_valid_slug("chăm-sóc"));
        assert!(!is_valid_slug("with space"));
    }
}
