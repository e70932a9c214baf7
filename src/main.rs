//! MyPham VN - storefront backend

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use myphamvn::{
    api::{self, AppState},
    config::Config,
    services::{LoginRateLimiter, SessionService},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "myphamvn=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting MyPham VN storefront...");

    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    let state = AppState::build(config).await?;
    tracing::info!("Services initialized");

    spawn_cleanup(
        state.session_service.clone(),
        state.rate_limiter.clone(),
        state.config.session.cleanup_interval_seconds,
    );

    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let app = api::build_router(state)?;

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Periodically purge expired sessions (and their carts) and stale login
/// failures.
fn spawn_cleanup(sessions: Arc<SessionService>, limiter: Arc<LoginRateLimiter>, every_secs: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(every_secs));
        // The first tick fires immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            match sessions.purge_expired().await {
                Ok(report) if report.sessions > 0 => tracing::info!(
                    sessions = report.sessions,
                    cart_lines = report.cart_lines,
                    "Purged expired sessions"
                ),
                Ok(_) => {}
                Err(e) => tracing::warn!("Failed to purge expired sessions: {}", e),
            }
            limiter.cleanup().await;
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
