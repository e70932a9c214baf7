//! Cart API endpoints
//!
//! Every operation is scoped to the caller's session. Lines belonging to
//! another session are reported as not found.
//!
//! - GET    /api/cart         - Lines joined with live product data
//! - GET    /api/cart/summary - Lines with item count and totals
//! - POST   /api/cart         - Add a product, merging into an existing line
//! - PUT    /api/cart/{id}    - Set a line's quantity
//! - DELETE /api/cart/{id}    - Remove one line
//! - DELETE /api/cart         - Remove every line

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};

use crate::api::common::{ApiJson, ApiPath};
use crate::api::middleware::{ApiError, AppState, CurrentSession};
use crate::models::{AddCartItemInput, CartItem, CartLine, CartSummary, UpdateCartItemInput};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cart", get(list_cart).post(add_to_cart).delete(clear_cart))
        .route("/cart/summary", get(cart_summary))
        .route("/cart/{id}", put(update_cart_item).delete(remove_cart_item))
}

async fn list_cart(
    State(state): State<AppState>,
    session: CurrentSession,
) -> Result<Json<Vec<CartLine>>, ApiError> {
    Ok(Json(state.cart_service.list_with_products(session.id()).await?))
}

async fn cart_summary(
    State(state): State<AppState>,
    session: CurrentSession,
) -> Result<Json<CartSummary>, ApiError> {
    Ok(Json(state.cart_service.summary(session.id()).await?))
}

async fn add_to_cart(
    State(state): State<AppState>,
    session: CurrentSession,
    ApiJson(input): ApiJson<AddCartItemInput>,
) -> Result<(StatusCode, Json<CartItem>), ApiError> {
    let item = state
        .cart_service
        .add_item(session.id(), input.product_id, input.quantity)
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn update_cart_item(
    State(state): State<AppState>,
    session: CurrentSession,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<UpdateCartItemInput>,
) -> Result<Json<CartItem>, ApiError> {
    state
        .cart_service
        .update_item(session.id(), id, input.quantity)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Cart item not found"))
}

async fn remove_cart_item(
    State(state): State<AppState>,
    session: CurrentSession,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    if state.cart_service.remove_item(session.id(), id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Cart item not found"))
    }
}

async fn clear_cart(
    State(state): State<AppState>,
    session: CurrentSession,
) -> Result<StatusCode, ApiError> {
    state.cart_service.clear(session.id()).await?;
    Ok(StatusCode::NO_CONTENT)
}
