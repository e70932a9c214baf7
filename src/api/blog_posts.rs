//! Blog post API endpoints
//!
//! - GET    /api/blog-posts        - List posts
//! - GET    /api/blog-posts/{slug} - Get one post by slug
//! - POST   /api/blog-posts        - Create (admin)
//! - PUT    /api/blog-posts/{id}   - Partial update (admin)
//! - DELETE /api/blog-posts/{id}   - Delete (admin)

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};

use crate::api::common::{ApiJson, ApiPath};
use crate::api::middleware::{ApiError, AppState};
use crate::models::{BlogPost, CreateBlogPostInput, UpdateBlogPostInput};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/blog-posts", get(list_posts))
        .route("/blog-posts/{id}", get(get_post))
}

pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/blog-posts", post(create_post))
        .route("/blog-posts/{id}", put(update_post).delete(delete_post))
}

async fn list_posts(State(state): State<AppState>) -> Result<Json<Vec<BlogPost>>, ApiError> {
    Ok(Json(state.blog_post_service.list().await?))
}

async fn get_post(
    State(state): State<AppState>,
    ApiPath(slug): ApiPath<String>,
) -> Result<Json<BlogPost>, ApiError> {
    state
        .blog_post_service
        .get_by_slug(&slug)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Blog post not found"))
}

async fn create_post(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateBlogPostInput>,
) -> Result<(StatusCode, Json<BlogPost>), ApiError> {
    let post = state.blog_post_service.create(input).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

async fn update_post(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<UpdateBlogPostInput>,
) -> Result<Json<BlogPost>, ApiError> {
    state
        .blog_post_service
        .update(id, input)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Blog post not found"))
}

async fn delete_post(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    if state.blog_post_service.delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Blog post not found"))
    }
}
