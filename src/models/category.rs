//! Category model
//!
//! Product categories shown in the storefront navigation and used to filter
//! the catalog.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::validate_slug;

/// Product category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Unique identifier
    pub id: i64,
    /// Display name
    pub name: String,
    /// URL-friendly slug, unique among categories
    pub slug: String,
    /// Cover image
    pub image_url: String,
}

impl Category {
    /// Create a new Category.
    ///
    /// The ID is set to 0 and assigned by the repository on insert.
    pub fn new(name: impl Into<String>, slug: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            slug: slug.into(),
            image_url: image_url.into(),
        }
    }
}

/// Input for creating a category
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryInput {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    /// Derived from the name when omitted
    #[serde(default)]
    #[validate(custom(function = "validate_slug"))]
    pub slug: Option<String>,
    #[validate(length(min = 1, message = "Image URL is required"))]
    pub image_url: String,
}

impl CreateCategoryInput {
    pub fn new(name: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slug: None,
            image_url: image_url.into(),
        }
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }
}

/// Partial update for a category. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryInput {
    #[validate(length(min = 1, max = 100, message = "Name must not be empty"))]
    pub name: Option<String>,
    #[validate(custom(function = "validate_slug"))]
    pub slug: Option<String>,
    #[validate(length(min = 1, message = "Image URL must not be empty"))]
    pub image_url: Option<String>,
}

impl UpdateCategoryInput {
    /// Shallow-merge the supplied fields into `category`.
    pub fn apply_to(&self, category: &mut Category) {
        if let Some(name) = &self.name {
            category.name = name.clone();
        }
        if let Some(slug) = &self.slug {
            category.slug = slug.clone();
        }
        if let Some(image_url) = &self.image_url {
            category.image_url = image_url.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_new() {
        let category = Category::new("Nước hoa", "nuoc-hoa", "https://img/1.jpg");
        assert_eq!(category.id, 0);
        assert_eq!(category.slug, "nuoc-hoa");
    }

    #[test]
    fn test_category_serializes_camel_case() {
        let category = Category::new("Nước hoa", "nuoc-hoa", "https://img/1.jpg");
        let json = serde_json::to_value(&category).unwrap();
        assert_eq!(json["imageUrl"], "https://img/1.jpg");
        assert!(json.get("image_url").is_none());
    }

    #[test]
    fn test_update_applies_only_supplied_fields() {
        let mut category = Category::new("Nước hoa", "nuoc-hoa", "https://img/1.jpg");
        let input = UpdateCategoryInput {
            name: Some("Nước hoa nữ".to_string()),
            ..Default::default()
        };
        input.apply_to(&mut category);
        assert_eq!(category.name, "Nước hoa nữ");
        assert_eq!(category.slug, "nuoc-hoa");
        assert_eq!(category.image_url, "https://img/1.jpg");
    }

    #[test]
    fn test_create_input_rejects_bad_slug() {
        let input = CreateCategoryInput::new("Nước hoa", "https://img/1.jpg").with_slug("Nuoc Hoa");
        assert!(input.validate().is_err());
    }
}
