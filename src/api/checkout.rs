//! Checkout API endpoint
//!
//! - POST /api/checkout - Place a simulated order for the session's cart

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};

use crate::api::common::ApiJson;
use crate::api::middleware::{ApiError, AppState, CurrentSession};
use crate::models::{CheckoutInput, OrderConfirmation};

pub fn router() -> Router<AppState> {
    Router::new().route("/checkout", post(place_order))
}

async fn place_order(
    State(state): State<AppState>,
    session: CurrentSession,
    ApiJson(input): ApiJson<CheckoutInput>,
) -> Result<(StatusCode, Json<OrderConfirmation>), ApiError> {
    let order = state
        .checkout_service
        .place_order(session.id(), input)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}
