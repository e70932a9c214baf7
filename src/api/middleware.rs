//! API middleware
//!
//! Contains:
//! - Application state shared by every handler
//! - The JSON error envelope
//! - Session resolution (cookie issue and rolling expiry)
//! - The admin guard

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::cache::CatalogCache;
use crate::config::{Config, SessionConfig};
use crate::db::{seed, Repositories};
use crate::models::{Session, User};
use crate::services::{
    BlogPostService, CartService, CategoryService, CheckoutService, ContactService,
    LoginRateLimiter, ProductService, ServiceError, SessionService, UserService,
};

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub category_service: Arc<CategoryService>,
    pub product_service: Arc<ProductService>,
    pub blog_post_service: Arc<BlogPostService>,
    pub cart_service: Arc<CartService>,
    pub checkout_service: Arc<CheckoutService>,
    pub contact_service: Arc<ContactService>,
    pub session_service: Arc<SessionService>,
    pub user_service: Arc<UserService>,
    pub rate_limiter: Arc<LoginRateLimiter>,
}

impl AppState {
    /// Wire services over fresh in-memory repositories and seed them when
    /// enabled.
    pub async fn build(config: Config) -> anyhow::Result<Self> {
        let repos = Repositories::in_memory();

        if config.seed.enabled {
            seed::seed(
                &repos,
                &config.seed.admin_username,
                &config.seed.admin_password,
            )
            .await?;
        }

        let cache = Arc::new(CatalogCache::new(&config.cache));
        let session_service = Arc::new(SessionService::new(
            repos.sessions.clone(),
            repos.cart_items.clone(),
            config.session.ttl_seconds,
        ));
        let rate_limiter = Arc::new(LoginRateLimiter::new(
            config.admin.login_max_attempts,
            config.admin.login_window_seconds,
        ));
        let cart_service = Arc::new(CartService::new(
            repos.cart_items.clone(),
            repos.products.clone(),
        ));

        Ok(Self {
            category_service: Arc::new(CategoryService::new(
                repos.categories.clone(),
                repos.products.clone(),
                cache.clone(),
            )),
            product_service: Arc::new(ProductService::new(
                repos.products.clone(),
                repos.categories.clone(),
                repos.cart_items.clone(),
                cache.clone(),
            )),
            blog_post_service: Arc::new(BlogPostService::new(repos.blog_posts.clone(), cache)),
            checkout_service: Arc::new(CheckoutService::new(cart_service.clone())),
            cart_service,
            contact_service: Arc::new(ContactService::new()),
            user_service: Arc::new(UserService::new(
                repos.users.clone(),
                session_service.clone(),
                rate_limiter.clone(),
            )),
            session_service,
            rate_limiter,
            config: Arc::new(config),
        })
    }
}

/// Session resolved for the current request
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Session);

impl CurrentSession {
    pub fn id(&self) -> &str {
        &self.0.id
    }
}

/// Admin user placed in the request by [`require_admin`]
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

/// Error response for API errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: Some(details),
            },
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("UNAUTHORIZED", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new("FORBIDDEN", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }

    pub fn status(&self) -> StatusCode {
        match self.error.code.as_str() {
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            "UNAUTHORIZED" => StatusCode::UNAUTHORIZED,
            "FORBIDDEN" => StatusCode::FORBIDDEN,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "CONFLICT" => StatusCode::CONFLICT,
            "RATE_LIMIT" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(fields) => ApiError::with_details(
                "VALIDATION_ERROR",
                "Validation failed",
                serde_json::json!(fields),
            ),
            ServiceError::NotFound(message) => ApiError::not_found(message),
            ServiceError::Conflict(message) => ApiError::new("CONFLICT", message),
            ServiceError::Integrity(message) => {
                tracing::error!(%message, "Integrity violation");
                ApiError::new("INTEGRITY_ERROR", message)
            }
            ServiceError::Unauthorized(message) => ApiError::unauthorized(message),
            ServiceError::Forbidden(message) => ApiError::forbidden(message),
            ServiceError::RateLimited { retry_after } => ApiError::with_details(
                "RATE_LIMIT",
                format!("Too many failed attempts, retry in {} seconds", retry_after),
                serde_json::json!({ "retryAfter": retry_after }),
            ),
            ServiceError::Internal(e) => {
                tracing::error!(error = ?e, "Internal error");
                ApiError::internal_error("Internal server error")
            }
        }
    }
}

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentSession>()
            .cloned()
            .ok_or_else(|| ApiError::internal_error("Session middleware is not installed"))
    }
}

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AdminUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Login required"))
    }
}

/// Extract the session token from the `Cookie` header
fn extract_session_token(request: &Request, cookie_name: &str) -> Option<String> {
    let cookie_header = request.headers().get(header::COOKIE)?.to_str().ok()?;
    cookie_header.split(';').find_map(|cookie| {
        let (name, value) = cookie.trim().split_once('=')?;
        (name == cookie_name && !value.is_empty()).then(|| value.to_string())
    })
}

/// `Set-Cookie` value for a freshly issued session
pub fn session_cookie(config: &SessionConfig, session_id: &str) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        config.cookie_name, session_id, config.ttl_seconds
    );
    if config.secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Session middleware
///
/// Resolves or issues the browser session and makes it available to
/// handlers as [`CurrentSession`]. A new session's cookie is attached to the
/// response.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_session_token(&request, &state.config.session.cookie_name);
    let resolved = state.session_service.resolve(token.as_deref()).await?;
    let session_id = resolved.session.id.clone();
    request
        .extensions_mut()
        .insert(CurrentSession(resolved.session));

    let mut response = next.run(request).await;

    if resolved.issued {
        match HeaderValue::from_str(&session_cookie(&state.config.session, &session_id)) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => tracing::error!(error = %e, "Invalid session cookie value"),
        }
    }
    Ok(response)
}

/// Admin authorization middleware
///
/// 401 without a logged-in user, 403 for a non-admin user.
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let session = request
        .extensions()
        .get::<CurrentSession>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("Login required"))?;

    let user = state.user_service.require_admin(&session.0).await?;
    request.extensions_mut().insert(AdminUser(user));
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;

    fn request_with_cookie(cookie: &str) -> Request<Body> {
        Request::builder()
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn test_extract_session_token_from_cookie() {
        let request = request_with_cookie("theme=dark; sid=abc-123; lang=vi");
        assert_eq!(
            extract_session_token(&request, "sid"),
            Some("abc-123".to_string())
        );
    }

    #[test]
    fn test_extract_session_token_ignores_prefix_match() {
        let request = request_with_cookie("xsid=abc; sid=");
        assert_eq!(extract_session_token(&request, "sid"), None);
    }

    #[test]
    fn test_extract_session_token_none() {
        let request = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(extract_session_token(&request, "sid"), None);
    }

    #[test]
    fn test_session_cookie_attributes() {
        let mut config = SessionConfig::default();
        assert_eq!(
            session_cookie(&config, "abc"),
            "sid=abc; HttpOnly; SameSite=Lax; Path=/; Max-Age=86400"
        );

        config.secure = true;
        assert!(session_cookie(&config, "abc").ends_with("; Secure"));
    }

    #[test]
    fn test_service_error_status_mapping() {
        let cases = [
            (ServiceError::invalid("quantity", "bad"), StatusCode::BAD_REQUEST),
            (ServiceError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ServiceError::Conflict("x".into()), StatusCode::CONFLICT),
            (ServiceError::Integrity("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (ServiceError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (ServiceError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (
                ServiceError::RateLimited { retry_after: 60 },
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (
                ServiceError::Internal(anyhow::anyhow!("boom")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn test_validation_details_shape() {
        let err = ApiError::from(ServiceError::invalid("quantity", "Quantity must be at least 1"));
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(json["error"]["details"][0]["field"], "quantity");
        assert_eq!(
            json["error"]["details"][0]["message"],
            "Quantity must be at least 1"
        );
    }

    #[test]
    fn test_internal_error_hides_cause() {
        let err = ApiError::from(ServiceError::Internal(anyhow::anyhow!("db password leaked")));
        assert_eq!(err.error.code, "INTERNAL_ERROR");
        assert!(!err.error.message.contains("leaked"));
    }
}
