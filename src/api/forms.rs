//! Contact form and newsletter endpoints
//!
//! - POST /api/contact    - Accept a contact message (202)
//! - POST /api/newsletter - Subscribe; 201 for a new address, 200 if already
//!   subscribed

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::Serialize;

use crate::api::common::ApiJson;
use crate::api::middleware::{ApiError, AppState};
use crate::models::{ContactInput, NewsletterInput};

#[derive(Debug, Serialize)]
pub struct FormResponse {
    pub message: &'static str,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/contact", post(submit_contact))
        .route("/newsletter", post(subscribe_newsletter))
}

async fn submit_contact(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<ContactInput>,
) -> Result<(StatusCode, Json<FormResponse>), ApiError> {
    state.contact_service.submit(input).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(FormResponse {
            message: "Message received",
        }),
    ))
}

async fn subscribe_newsletter(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewsletterInput>,
) -> Result<(StatusCode, Json<FormResponse>), ApiError> {
    let response = if state.contact_service.subscribe(input).await? {
        (StatusCode::CREATED, Json(FormResponse { message: "Subscribed" }))
    } else {
        (
            StatusCode::OK,
            Json(FormResponse {
                message: "Already subscribed",
            }),
        )
    };
    Ok(response)
}
