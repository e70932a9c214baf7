//! User service
//!
//! Back-office users and admin login. Logging in binds the user to the
//! caller's existing browser session, so the cart survives a login.

use crate::db::repositories::UserRepository;
use crate::models::{LoginInput, Session, User};
use crate::services::password::{hash_password_blocking, verify_password_blocking};
use anyhow::Context;
use std::sync::Arc;
use validator::Validate;

use super::rate_limiter::LoginRateLimiter;
use super::session::SessionService;
use super::ServiceError;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// User service for admin accounts and authentication
pub struct UserService {
    users: Arc<dyn UserRepository>,
    sessions: Arc<SessionService>,
    limiter: Arc<LoginRateLimiter>,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        sessions: Arc<SessionService>,
        limiter: Arc<LoginRateLimiter>,
    ) -> Self {
        Self {
            users,
            sessions,
            limiter,
        }
    }

    /// Create a user with a hashed password
    ///
    /// # Errors
    /// - `Validation` for an empty username or password, or a taken username
    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        is_admin: bool,
    ) -> Result<User, ServiceError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ServiceError::invalid("username", "Username is required"));
        }
        if password.is_empty() {
            return Err(ServiceError::invalid("password", "Password is required"));
        }
        if self
            .users
            .exists_by_username(username)
            .await
            .context("Failed to check username")?
        {
            return Err(ServiceError::invalid(
                "username",
                format!("Username '{}' is already taken", username),
            ));
        }

        let password_hash = hash_password_blocking(password.to_string()).await?;
        let created = self
            .users
            .create(&User::new(username, password_hash, is_admin))
            .await
            .context("Failed to create user")?;
        tracing::info!(id = created.id, username = %created.username, "User created");
        Ok(created)
    }

    /// Check credentials and bind the user to the session.
    ///
    /// # Errors
    /// - `Unauthorized` for an unknown user or a wrong password
    /// - `RateLimited` after too many recent failures for the username
    pub async fn login(&self, session_id: &str, input: LoginInput) -> Result<User, ServiceError> {
        input.validate()?;
        let username = input.username.trim();

        if self.limiter.is_limited(username).await {
            tracing::warn!(username = %username, "Login refused: too many failed attempts");
            return Err(ServiceError::RateLimited {
                retry_after: self.limiter.window_seconds(),
            });
        }

        let user = self
            .users
            .get_by_username(username)
            .await
            .context("Failed to get user")?;
        let authenticated = match user {
            Some(user) => verify_password_blocking(input.password.clone(), user.password_hash.clone())
                .await?
                .then_some(user),
            None => None,
        };
        let Some(user) = authenticated else {
            self.limiter.record_failure(username).await;
            tracing::warn!(username = %username, "Login failed: invalid credentials");
            return Err(ServiceError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };

        self.limiter.clear(username).await;
        self.sessions.bind_user(session_id, user.id).await?;
        tracing::info!(user_id = user.id, "User logged in");
        Ok(user)
    }

    pub async fn logout(&self, session_id: &str) -> Result<(), ServiceError> {
        self.sessions.unbind_user(session_id).await
    }

    /// The user bound to the session, if any
    pub async fn current_user(&self, session: &Session) -> Result<Option<User>, ServiceError> {
        match session.user_id {
            Some(user_id) => Ok(self
                .users
                .get_by_id(user_id)
                .await
                .context("Failed to get user")?),
            None => Ok(None),
        }
    }

    /// # Errors
    /// - `Unauthorized` when nobody is logged in
    /// - `Forbidden` when the user is not an admin
    pub async fn require_admin(&self, session: &Session) -> Result<User, ServiceError> {
        let user = self
            .current_user(session)
            .await?
            .ok_or_else(|| ServiceError::Unauthorized("Login required".to_string()))?;
        if !user.is_admin {
            return Err(ServiceError::Forbidden("Admin access required".to_string()));
        }
        Ok(user)
    }
}
