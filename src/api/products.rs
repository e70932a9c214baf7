//! Product API endpoints
//!
//! - GET    /api/products        - List, filtered by `featured`, `new` or
//!   `categoryId`, then narrowed by `q`, `minPrice`, `maxPrice` and ordered
//!   by `sort`
//! - GET    /api/products/{slug} - Get one product by slug
//! - POST   /api/products        - Create (admin)
//! - PUT    /api/products/{id}   - Partial update (admin)
//! - DELETE /api/products/{id}   - Delete (admin); also drops its cart lines

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};

use crate::api::common::{ApiJson, ApiPath, ApiQuery};
use crate::api::middleware::{ApiError, AppState};
use crate::models::{CreateProductInput, Product, ProductQuery, UpdateProductInput};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/{id}", get(get_product))
}

pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/products", post(create_product))
        .route("/products/{id}", put(update_product).delete(delete_product))
}

async fn list_products(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ProductQuery>,
) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(state.product_service.list(&query).await?))
}

async fn get_product(
    State(state): State<AppState>,
    ApiPath(slug): ApiPath<String>,
) -> Result<Json<Product>, ApiError> {
    state
        .product_service
        .get_by_slug(&slug)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Product not found"))
}

async fn create_product(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateProductInput>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let product = state.product_service.create(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

async fn update_product(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<UpdateProductInput>,
) -> Result<Json<Product>, ApiError> {
    state
        .product_service
        .update(id, input)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Product not found"))
}

async fn delete_product(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    if state.product_service.delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Product not found"))
    }
}
