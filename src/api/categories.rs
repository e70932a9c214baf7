//! Category API endpoints
//!
//! - GET    /api/categories        - List categories
//! - GET    /api/categories/{slug} - Get one category by slug
//! - POST   /api/categories        - Create (admin)
//! - PUT    /api/categories/{id}   - Partial update (admin)
//! - DELETE /api/categories/{id}   - Delete (admin)
//!
//! Reads and writes share one path so their method routers merge; reads
//! interpret the segment as a slug and writes as a numeric id.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};

use crate::api::common::{ApiJson, ApiPath};
use crate::api::middleware::{ApiError, AppState};
use crate::models::{Category, CreateCategoryInput, UpdateCategoryInput};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories))
        .route("/categories/{id}", get(get_category))
}

pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/categories", post(create_category))
        .route(
            "/categories/{id}",
            put(update_category).delete(delete_category),
        )
}

async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(state.category_service.list().await?))
}

async fn get_category(
    State(state): State<AppState>,
    ApiPath(slug): ApiPath<String>,
) -> Result<Json<Category>, ApiError> {
    state
        .category_service
        .get_by_slug(&slug)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Category not found"))
}

async fn create_category(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateCategoryInput>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let category = state.category_service.create(input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

async fn update_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<UpdateCategoryInput>,
) -> Result<Json<Category>, ApiError> {
    state
        .category_service
        .update(id, input)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Category not found"))
}

async fn delete_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    if state.category_service.delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Category not found"))
    }
}
