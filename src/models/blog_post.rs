//! Blog post model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::validate_slug;

/// Beauty blog article.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    /// Unique identifier
    pub id: i64,
    pub title: String,
    /// URL-friendly slug, unique among posts
    pub slug: String,
    /// Full article body
    pub content: String,
    /// Short teaser shown in listings
    pub excerpt: String,
    pub image_url: String,
    pub publish_date: DateTime<Utc>,
    /// Free-text topic label, not a reference to a product category
    pub category: String,
}

/// Input for creating a blog post
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBlogPostInput {
    #[validate(length(min = 1, max = 300, message = "Title is required"))]
    pub title: String,
    /// Derived from the title when omitted
    #[serde(default)]
    #[validate(custom(function = "validate_slug"))]
    pub slug: Option<String>,
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
    #[serde(default)]
    pub excerpt: String,
    #[validate(length(min = 1, message = "Image URL is required"))]
    pub image_url: String,
    /// Defaults to the creation time
    #[serde(default)]
    pub publish_date: Option<DateTime<Utc>>,
    #[validate(length(min = 1, max = 100, message = "Category is required"))]
    pub category: String,
}

impl CreateBlogPostInput {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            slug: None,
            content: content.into(),
            excerpt: String::new(),
            image_url: "https://images.unsplash.com/photo-1522335789203-aabd1fc54bc9".to_string(),
            publish_date: None,
            category: category.into(),
        }
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    pub fn into_post(self, slug: String) -> BlogPost {
        BlogPost {
            id: 0,
            title: self.title,
            slug,
            content: self.content,
            excerpt: self.excerpt,
            image_url: self.image_url,
            publish_date: self.publish_date.unwrap_or_else(Utc::now),
            category: self.category,
        }
    }
}

/// Partial update for a blog post. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBlogPostInput {
    #[validate(length(min = 1, max = 300, message = "Title must not be empty"))]
    pub title: Option<String>,
    #[validate(custom(function = "validate_slug"))]
    pub slug: Option<String>,
    #[validate(length(min = 1, message = "Content must not be empty"))]
    pub content: Option<String>,
    pub excerpt: Option<String>,
    #[validate(length(min = 1, message = "Image URL must not be empty"))]
    pub image_url: Option<String>,
    pub publish_date: Option<DateTime<Utc>>,
    #[validate(length(min = 1, max = 100, message = "Category must not be empty"))]
    pub category: Option<String>,
}

impl UpdateBlogPostInput {
    pub fn apply_to(&self, post: &mut BlogPost) {
        if let Some(title) = &self.title {
            post.title = title.clone();
        }
        if let Some(slug) = &self.slug {
            post.slug = slug.clone();
        }
        if let Some(content) = &self.content {
            post.content = content.clone();
        }
        if let Some(excerpt) = &self.excerpt {
            post.excerpt = excerpt.clone();
        }
        if let Some(image_url) = &self.image_url {
            post.image_url = image_url.clone();
        }
        if let Some(publish_date) = self.publish_date {
            post.publish_date = publish_date;
        }
        if let Some(category) = &self.category {
            post.category = category.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_into_post_defaults_publish_date() {
        let before = Utc::now();
        let post = CreateBlogPostInput::new("Title", "Body", "Trang điểm").into_post("title".into());
        assert!(post.publish_date >= before);
        assert_eq!(post.id, 0);
    }

    #[test]
    fn test_publish_date_round_trips_as_rfc3339() {
        let mut post = CreateBlogPostInput::new("Title", "Body", "Trang điểm").into_post("title".into());
        post.publish_date = Utc.with_ymd_and_hms(2023, 6, 12, 0, 0, 0).unwrap();
        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["publishDate"], "2023-06-12T00:00:00Z");
    }

    #[test]
    fn test_update_applies_only_supplied_fields() {
        let mut post = CreateBlogPostInput::new("Title", "Body", "Trang điểm").into_post("title".into());
        let input = UpdateBlogPostInput {
            excerpt: Some("Short".to_string()),
            ..Default::default()
        };
        input.apply_to(&mut post);
        assert_eq!(post.excerpt, "Short");
        assert_eq!(post.title, "Title");
    }
}
