//! Session repository
//!
//! Sessions are keyed by their opaque token rather than an integer identity,
//! so they live in a plain map instead of a `MemoryTable`.

use crate::models::Session;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Session repository trait
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Create a new session
    async fn create(&self, session: &Session) -> Result<Session>;

    /// Get session by ID (token)
    async fn get_by_id(&self, id: &str) -> Result<Option<Session>>;

    /// Push the expiry of an existing session forward
    async fn touch(&self, id: &str, expires_at: DateTime<Utc>) -> Result<Option<Session>>;

    /// Bind (or with `None`, unbind) a user to the session
    async fn set_user(&self, id: &str, user_id: Option<i64>) -> Result<Option<Session>>;

    /// Delete a session
    async fn delete(&self, id: &str) -> Result<bool>;

    /// Delete sessions expired at `now`; returns their IDs
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<Vec<String>>;

    async fn count(&self) -> Result<usize>;
}

/// In-memory session repository
#[derive(Default)]
pub struct MemorySessionRepository {
    sessions: RwLock<HashMap<String, Session>>,
}

impl MemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed() -> Arc<dyn SessionRepository> {
        Arc::new(Self::new())
    }
}

#[async_trait]
impl SessionRepository for MemorySessionRepository {
    async fn create(&self, session: &Session) -> Result<Session> {
        self.sessions
            .write()
            .await
            .insert(session.id.clone(), session.clone());
        Ok(session.clone())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Session>> {
        Ok(self.sessions.read().await.get(id).cloned())
    }

    async fn touch(&self, id: &str, expires_at: DateTime<Utc>) -> Result<Option<Session>> {
        let mut sessions = self.sessions.write().await;
        Ok(sessions.get_mut(id).map(|session| {
            session.expires_at = expires_at;
            session.clone()
        }))
    }

    async fn set_user(&self, id: &str, user_id: Option<i64>) -> Result<Option<Session>> {
        let mut sessions = self.sessions.write().await;
        Ok(sessions.get_mut(id).map(|session| {
            session.user_id = user_id;
            session.clone()
        }))
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.sessions.write().await.remove(id).is_some())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<Vec<String>> {
        let mut sessions = self.sessions.write().await;
        let expired: Vec<String> = sessions
            .values()
            .filter(|session| session.is_expired_at(now))
            .map(|session| session.id.clone())
            .collect();
        for id in &expired {
            sessions.remove(id);
        }
        Ok(expired)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.sessions.read().await.len())
    }
}
