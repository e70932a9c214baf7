//! Session service
//!
//! Resolves the anonymous browser session behind every request, issuing a
//! fresh one when the presented token is missing, unknown or expired. Valid
//! sessions get a rolling expiry. Expired sessions are purged together with
//! their carts.

use crate::db::repositories::{CartItemRepository, SessionRepository};
use crate::models::Session;
use anyhow::Context;
use chrono::{Duration, Utc};
use futures::future::try_join_all;
use std::sync::Arc;

use super::ServiceError;

/// Session attached to the current request
#[derive(Debug, Clone)]
pub struct ResolvedSession {
    pub session: Session,
    /// True when the session was created for this request and the cookie
    /// must be sent back
    pub issued: bool,
}

/// What one purge pass removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeReport {
    pub sessions: usize,
    pub cart_lines: usize,
}

/// Session service
pub struct SessionService {
    sessions: Arc<dyn SessionRepository>,
    cart_items: Arc<dyn CartItemRepository>,
    ttl: Duration,
}

impl SessionService {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        cart_items: Arc<dyn CartItemRepository>,
        ttl_seconds: u64,
    ) -> Self {
        let ttl = i64::try_from(ttl_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or_else(|| Duration::days(1));
        Self {
            sessions,
            cart_items,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Resolve the presented token, or issue a new session.
    pub async fn resolve(&self, token: Option<&str>) -> Result<ResolvedSession, ServiceError> {
        if let Some(token) = token {
            if let Some(session) = self
                .sessions
                .get_by_id(token)
                .await
                .context("Failed to get session")?
            {
                if !session.is_expired() {
                    let expires_at = Utc::now() + self.ttl;
                    if let Some(session) = self
                        .sessions
                        .touch(&session.id, expires_at)
                        .await
                        .context("Failed to extend session")?
                    {
                        return Ok(ResolvedSession {
                            session,
                            issued: false,
                        });
                    }
                } else {
                    self.discard(&session.id).await?;
                    tracing::debug!("Expired session presented; issuing a new one");
                }
            }
        }

        let session = self
            .sessions
            .create(&Session::issue(self.ttl))
            .await
            .context("Failed to create session")?;
        tracing::debug!(session_id = %session.id, "Session issued");
        Ok(ResolvedSession {
            session,
            issued: true,
        })
    }

    /// Attach a logged-in user to the session
    pub async fn bind_user(&self, session_id: &str, user_id: i64) -> Result<Session, ServiceError> {
        self.sessions
            .set_user(session_id, Some(user_id))
            .await
            .context("Failed to bind user to session")?
            .ok_or_else(|| ServiceError::not_found("Session", session_id))
    }

    /// Detach the user; the session and its cart stay
    pub async fn unbind_user(&self, session_id: &str) -> Result<(), ServiceError> {
        self.sessions
            .set_user(session_id, None)
            .await
            .context("Failed to unbind user from session")?;
        Ok(())
    }

    /// Delete every expired session and its cart lines
    pub async fn purge_expired(&self) -> Result<PurgeReport, ServiceError> {
        let expired = self
            .sessions
            .delete_expired(Utc::now())
            .await
            .context("Failed to delete expired sessions")?;

        let cleared = try_join_all(expired.iter().map(|session_id| self.cart_items.clear(session_id)))
            .await
            .context("Failed to clear carts of expired sessions")?;

        Ok(PurgeReport {
            sessions: expired.len(),
            cart_lines: cleared.into_iter().sum(),
        })
    }

    pub async fn active_count(&self) -> Result<usize, ServiceError> {
        Ok(self.sessions.count().await.context("Failed to count sessions")?)
    }

    async fn discard(&self, session_id: &str) -> Result<(), ServiceError> {
        self.sessions
            .delete(session_id)
            .await
            .context("Failed to delete session")?;
        self.cart_items
            .clear(session_id)
            .await
            .context("Failed to clear cart of expired session")?;
        Ok(())
    }
}
