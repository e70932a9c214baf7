//! Admin API endpoints
//!
//! - GET /api/admin/stats - Dashboard counts

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::api::middleware::{ApiError, AppState};
use crate::models::ProductQuery;

/// Response for dashboard stats
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub products: usize,
    pub categories: usize,
    pub blog_posts: usize,
    pub featured_products: usize,
    pub out_of_stock: usize,
    pub active_sessions: usize,
    pub contact_messages: usize,
    pub newsletter_subscribers: usize,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/admin/stats", get(get_dashboard))
}

async fn get_dashboard(State(state): State<AppState>) -> Result<Json<DashboardResponse>, ApiError> {
    let products = state.product_service.list(&ProductQuery::default()).await?;
    let categories = state.category_service.list().await?;
    let blog_posts = state.blog_post_service.list().await?;

    Ok(Json(DashboardResponse {
        products: products.len(),
        categories: categories.len(),
        blog_posts: blog_posts.len(),
        featured_products: products.iter().filter(|p| p.featured).count(),
        out_of_stock: products.iter().filter(|p| !p.in_stock()).count(),
        active_sessions: state.session_service.active_count().await?,
        contact_messages: state.contact_service.message_count().await,
        newsletter_subscribers: state.contact_service.subscriber_count().await,
    }))
}
