//! Authentication API endpoints
//!
//! Login binds an admin user to the caller's existing session cookie; no
//! separate token is issued.
//!
//! - POST /api/auth/login  - Check credentials
//! - POST /api/auth/logout - Unbind the user (204)
//! - GET  /api/auth/me     - Current user or 401

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use crate::api::common::ApiJson;
use crate::api::middleware::{ApiError, AppState, CurrentSession};
use crate::models::{LoginInput, User};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
}

async fn login(
    State(state): State<AppState>,
    session: CurrentSession,
    ApiJson(input): ApiJson<LoginInput>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.user_service.login(session.id(), input).await?))
}

async fn logout(
    State(state): State<AppState>,
    session: CurrentSession,
) -> Result<StatusCode, ApiError> {
    state.user_service.logout(session.id()).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn me(State(state): State<AppState>, session: CurrentSession) -> Result<Json<User>, ApiError> {
    state
        .user_service
        .current_user(&session.0)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::unauthorized("Not logged in"))
}
