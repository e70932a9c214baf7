//! Product model
//!
//! Catalog products plus the create/update payloads and the listing query.
//! Prices are whole VND amounts.

use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use super::validate_slug;

/// Catalog product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier
    pub id: i64,
    pub name: String,
    /// URL-friendly slug, unique among products
    pub slug: String,
    pub description: String,
    /// List price in VND
    pub price: i64,
    /// Discounted price in VND, if on sale
    pub sale_price: Option<i64>,
    pub image_url: String,
    /// Owning category
    pub category_id: i64,
    /// Units in stock
    pub stock: i64,
    /// Shown on the home page
    pub featured: bool,
    /// Shown in the "new arrivals" section
    pub is_new: bool,
    /// Average review score, 0 to 5
    pub rating: f64,
    pub num_reviews: i64,
}

impl Product {
    /// Price the customer actually pays per unit.
    pub fn effective_price(&self) -> i64 {
        self.sale_price.unwrap_or(self.price)
    }

    pub fn is_on_sale(&self) -> bool {
        self.sale_price.is_some()
    }

    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// Input for creating a product
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductInput {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,
    /// Derived from the name when omitted
    #[serde(default)]
    #[validate(custom(function = "validate_slug"))]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 0, message = "Price must not be negative"))]
    pub price: i64,
    #[serde(default)]
    #[validate(range(min = 0, message = "Sale price must not be negative"))]
    pub sale_price: Option<i64>,
    #[validate(length(min = 1, message = "Image URL is required"))]
    pub image_url: String,
    pub category_id: i64,
    #[serde(default)]
    #[validate(range(min = 0, message = "Stock must not be negative"))]
    pub stock: i64,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub is_new: bool,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 5.0, message = "Rating must be between 0 and 5"))]
    pub rating: f64,
    #[serde(default)]
    #[validate(range(min = 0, message = "Review count must not be negative"))]
    pub num_reviews: i64,
}

impl CreateProductInput {
    pub fn new(name: impl Into<String>, price: i64, category_id: i64) -> Self {
        Self {
            name: name.into(),
            slug: None,
            description: String::new(),
            price,
            sale_price: None,
            image_url: "https://images.unsplash.com/photo-1556228578-8c89e6adf883".to_string(),
            category_id,
            stock: 0,
            featured: false,
            is_new: false,
            rating: 0.0,
            num_reviews: 0,
        }
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    pub fn with_sale_price(mut self, sale_price: i64) -> Self {
        self.sale_price = Some(sale_price);
        self
    }

    pub fn with_stock(mut self, stock: i64) -> Self {
        self.stock = stock;
        self
    }

    pub fn featured(mut self) -> Self {
        self.featured = true;
        self
    }

    pub fn new_arrival(mut self) -> Self {
        self.is_new = true;
        self
    }

    /// Build the product record; the repository assigns the id.
    pub fn into_product(self, slug: String) -> Product {
        Product {
            id: 0,
            name: self.name,
            slug,
            description: self.description,
            price: self.price,
            sale_price: self.sale_price,
            image_url: self.image_url,
            category_id: self.category_id,
            stock: self.stock,
            featured: self.featured,
            is_new: self.is_new,
            rating: self.rating,
            num_reviews: self.num_reviews,
        }
    }
}

/// Partial update for a product. Absent fields are left unchanged.
///
/// `salePrice: null` clears the sale price; omitting it keeps the current one.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductInput {
    #[validate(length(min = 1, max = 200, message = "Name must not be empty"))]
    pub name: Option<String>,
    #[validate(custom(function = "validate_slug"))]
    pub slug: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0, message = "Price must not be negative"))]
    pub price: Option<i64>,
    #[serde(default, deserialize_with = "double_option")]
    pub sale_price: Option<Option<i64>>,
    #[validate(length(min = 1, message = "Image URL must not be empty"))]
    pub image_url: Option<String>,
    pub category_id: Option<i64>,
    #[validate(range(min = 0, message = "Stock must not be negative"))]
    pub stock: Option<i64>,
    pub featured: Option<bool>,
    pub is_new: Option<bool>,
    #[validate(range(min = 0.0, max = 5.0, message = "Rating must be between 0 and 5"))]
    pub rating: Option<f64>,
    #[validate(range(min = 0, message = "Review count must not be negative"))]
    pub num_reviews: Option<i64>,
}

impl UpdateProductInput {
    /// Shallow-merge the supplied fields into `product`.
    pub fn apply_to(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name = name.clone();
        }
        if let Some(slug) = &self.slug {
            product.slug = slug.clone();
        }
        if let Some(description) = &self.description {
            product.description = description.clone();
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(sale_price) = self.sale_price {
            product.sale_price = sale_price;
        }
        if let Some(image_url) = &self.image_url {
            product.image_url = image_url.clone();
        }
        if let Some(category_id) = self.category_id {
            product.category_id = category_id;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(featured) = self.featured {
            product.featured = featured;
        }
        if let Some(is_new) = self.is_new {
            product.is_new = is_new;
        }
        if let Some(rating) = self.rating {
            product.rating = rating;
        }
        if let Some(num_reviews) = self.num_reviews {
            product.num_reviews = num_reviews;
        }
    }
}

fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Sort order for product listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProductSort {
    /// Insertion order
    #[default]
    Default,
    PriceAsc,
    PriceDesc,
    NameAsc,
    NameDesc,
    RatingDesc,
}

impl ProductSort {
    /// Sort in place. Prices compare on the effective price; ties keep
    /// insertion order.
    pub fn apply(self, products: &mut [Product]) {
        match self {
            ProductSort::Default => {}
            ProductSort::PriceAsc => products.sort_by_key(|p| p.effective_price()),
            ProductSort::PriceDesc => {
                products.sort_by_key(|p| std::cmp::Reverse(p.effective_price()))
            }
            ProductSort::NameAsc => products.sort_by_key(|p| p.name.to_lowercase()),
            ProductSort::NameDesc => {
                products.sort_by_key(|p| std::cmp::Reverse(p.name.to_lowercase()))
            }
            ProductSort::RatingDesc => products.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
        }
    }
}

/// Query string accepted by the product listing.
///
/// `featured`, `new` and `categoryId` pick the base set, checked in that
/// order. The remaining fields narrow and order it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    pub featured: Option<String>,
    pub new: Option<String>,
    pub category_id: Option<i64>,
    /// Case-insensitive name search
    pub q: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    #[serde(default)]
    pub sort: ProductSort,
}

impl ProductQuery {
    pub fn featured_only(&self) -> bool {
        self.featured.as_deref() == Some("true")
    }

    pub fn new_only(&self) -> bool {
        self.new.as_deref() == Some("true")
    }

    /// Whether `product` passes the search and price-range filters.
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(q) = self.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            if !product.name.to_lowercase().contains(&q.to_lowercase()) {
                return false;
            }
        }
        let price = product.effective_price();
        if self.min_price.is_some_and(|min| price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| price > max) {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(name: &str, price: i64, sale_price: Option<i64>, rating: f64) -> Product {
        let mut input = CreateProductInput::new(name, price, 1);
        input.sale_price = sale_price;
        input.rating = rating;
        input.into_product(name.to_lowercase())
    }

    #[test]
    fn test_effective_price_prefers_sale_price() {
        assert_eq!(product("A", 500_000, Some(420_000), 0.0).effective_price(), 420_000);
        assert_eq!(product("B", 590_000, None, 0.0).effective_price(), 590_000);
    }

    #[test]
    fn test_update_sale_price_null_clears() {
        let input: UpdateProductInput = serde_json::from_str(r#"{"salePrice": null}"#).unwrap();
        assert_eq!(input.sale_price, Some(None));

        let mut p = product("A", 500_000, Some(420_000), 0.0);
        input.apply_to(&mut p);
        assert_eq!(p.sale_price, None);
    }

    #[test]
    fn test_update_sale_price_omitted_keeps() {
        let input: UpdateProductInput = serde_json::from_str(r#"{"stock": 3}"#).unwrap();
        assert_eq!(input.sale_price, None);

        let mut p = product("A", 500_000, Some(420_000), 0.0);
        input.apply_to(&mut p);
        assert_eq!(p.sale_price, Some(420_000));
        assert_eq!(p.stock, 3);
    }

    #[test]
    fn test_create_input_validation() {
        let mut input = CreateProductInput::new("Serum", -1, 1);
        assert!(input.validate().is_err());
        input.price = 100;
        assert!(input.validate().is_ok());
        input.rating = 5.5;
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_sort_by_effective_price() {
        let mut products = vec![
            product("A", 500_000, Some(100_000), 0.0),
            product("B", 200_000, None, 0.0),
            product("C", 300_000, None, 0.0),
        ];
        ProductSort::PriceAsc.apply(&mut products);
        let names: Vec<_> = products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);

        ProductSort::PriceDesc.apply(&mut products);
        let names: Vec<_> = products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["C", "B", "A"]);
    }

    #[test]
    fn test_sort_by_rating_and_name() {
        let mut products = vec![
            product("son", 1, None, 4.0),
            product("Kem", 1, None, 5.0),
            product("dau", 1, None, 4.5),
        ];
        ProductSort::RatingDesc.apply(&mut products);
        assert_eq!(products[0].name, "Kem");
        assert_eq!(products[2].name, "son");

        ProductSort::NameAsc.apply(&mut products);
        let names: Vec<_> = products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["dau", "Kem", "son"]);
    }

    #[test]
    fn test_sort_parses_kebab_case() {
        let query: ProductQuery =
            serde_json::from_str(r#"{"sort": "rating-desc", "minPrice": 10}"#).unwrap();
        assert_eq!(query.sort, ProductSort::RatingDesc);
        assert_eq!(query.min_price, Some(10));
    }

    #[test]
    fn test_query_matches_search_and_price_range() {
        let p = product("Serum Vitamin C", 590_000, Some(500_000), 4.0);
        let query = ProductQuery {
            q: Some("vitamin".to_string()),
            min_price: Some(400_000),
            max_price: Some(550_000),
            ..Default::default()
        };
        assert!(query.matches(&p));

        let query = ProductQuery {
            max_price: Some(499_999),
            ..Default::default()
        };
        assert!(!query.matches(&p));

        let query = ProductQuery {
            q: Some("son".to_string()),
            ..Default::default()
        };
        assert!(!query.matches(&p));
    }

    #[test]
    fn test_query_flags_require_literal_true() {
        let query = ProductQuery {
            featured: Some("yes".to_string()),
            new: Some("true".to_string()),
            ..Default::default()
        };
        assert!(!query.featured_only());
        assert!(query.new_only());
    }
}
