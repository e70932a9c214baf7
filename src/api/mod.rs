//! API layer - HTTP handlers and routing
//!
//! Every endpoint lives under `/api`:
//! - Catalog endpoints (categories, products, blog posts)
//! - Session cart and checkout
//! - Contact form and newsletter
//! - Admin login and dashboard
//! - Health probe

pub mod admin;
pub mod auth;
pub mod blog_posts;
pub mod cart;
pub mod categories;
pub mod checkout;
pub mod common;
pub mod forms;
pub mod middleware;
pub mod products;
pub mod site;


use anyhow::Context;
use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use middleware::{ApiError, AppState, CurrentSession};

/// Build the API router (mounted under `/api`)
pub fn build_api_router(state: &AppState) -> Router<AppState> {
    // Catalog mutations and the dashboard
    let admin_routes = Router::new()
        .merge(categories::admin_router())
        .merge(products::admin_router())
        .merge(blog_posts::admin_router())
        .merge(admin::router());

    let admin_routes = if state.config.admin.require_auth {
        admin_routes.route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_admin,
        ))
    } else {
        tracing::warn!("Admin routes are open: admin.require_auth is disabled");
        admin_routes
    };

    Router::new()
        .merge(categories::router())
        .merge(products::router())
        .merge(blog_posts::router())
        .merge(cart::router())
        .merge(checkout::router())
        .merge(forms::router())
        .merge(auth::router())
        .merge(site::router())
        .merge(admin_routes)
}

/// Build the complete router with middleware
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let origin = state
        .config
        .server
        .cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid CORS origin: {}", state.config.server.cors_origin))?;

    // Credentials are allowed so the session cookie crosses origins
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::COOKIE])
        .allow_credentials(true);

    Ok(Router::new()
        .nest("/api", build_api_router(&state))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::session_middleware,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}
