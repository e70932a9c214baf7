//! Configuration management
//!
//! Configuration is loaded from `config.yml` and then overridden by
//! `MYPHAM_*` environment variables. Every field has a default, so a missing
//! or empty file yields a runnable configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub seed: SeedConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origin; credentials are allowed so the session cookie
    /// reaches the API from the storefront
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_cors_origin() -> String {
    "http://localhost:5173".to_string()
}

/// Browser session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Name of the session cookie
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Idle lifetime; every request pushes the expiry forward by this much
    #[serde(default = "default_session_ttl")]
    pub ttl_seconds: u64,
    /// Add the `Secure` attribute to the cookie
    #[serde(default)]
    pub secure: bool,
    /// How often expired sessions and their carts are purged
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_seconds: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            ttl_seconds: default_session_ttl(),
            secure: false,
            cleanup_interval_seconds: default_cleanup_interval(),
        }
    }
}

fn default_cookie_name() -> String {
    "sid".to_string()
}

fn default_session_ttl() -> u64 {
    24 * 60 * 60
}

fn default_cleanup_interval() -> u64 {
    600
}

/// Catalog cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Cache TTL in seconds
    #[serde(default = "default_cache_ttl")]
    pub ttl_seconds: u64,
    /// Maximum entries per namespace
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: default_cache_ttl(),
            max_capacity: default_max_capacity(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_cache_ttl() -> u64 {
    300
}

fn default_max_capacity() -> u64 {
    1_000
}

/// Admin surface configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Require a logged-in admin for catalog mutations and `/admin/*`
    #[serde(default = "default_true")]
    pub require_auth: bool,
    /// Failed logins allowed per username within the window
    #[serde(default = "default_login_max_attempts")]
    pub login_max_attempts: u32,
    #[serde(default = "default_login_window")]
    pub login_window_seconds: u64,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            require_auth: true,
            login_max_attempts: default_login_max_attempts(),
            login_window_seconds: default_login_window(),
        }
    }
}

fn default_login_max_attempts() -> u32 {
    5
}

fn default_login_window() -> u64 {
    900
}

/// Startup seed configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_admin_username")]
    pub admin_username: String,
    #[serde(default = "default_admin_password")]
    pub admin_password: String,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            admin_username: default_admin_username(),
            admin_password: default_admin_password(),
        }
    }
}

fn default_admin_username() -> String {
    "admin".to_string()
}

fn default_admin_password() -> String {
    "admin123".to_string()
}

/// Error type for configuration parsing
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

impl Config {
    /// Load configuration from file.
    ///
    /// A missing or empty file yields the defaults. Invalid YAML is an error
    /// that names the line and column.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: format_yaml_error(&e),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file with environment variable overrides.
    ///
    /// Recognized variables:
    /// - MYPHAM_SERVER_HOST, MYPHAM_SERVER_PORT, MYPHAM_SERVER_CORS_ORIGIN
    /// - MYPHAM_SESSION_COOKIE_NAME, MYPHAM_SESSION_TTL_SECONDS,
    ///   MYPHAM_SESSION_SECURE, MYPHAM_SESSION_CLEANUP_INTERVAL_SECONDS
    /// - MYPHAM_CACHE_ENABLED, MYPHAM_CACHE_TTL_SECONDS, MYPHAM_CACHE_MAX_CAPACITY
    /// - MYPHAM_ADMIN_REQUIRE_AUTH, MYPHAM_ADMIN_LOGIN_MAX_ATTEMPTS,
    ///   MYPHAM_ADMIN_LOGIN_WINDOW_SECONDS
    /// - MYPHAM_SEED_ENABLED, MYPHAM_SEED_ADMIN_USERNAME, MYPHAM_SEED_ADMIN_PASSWORD
    ///
    /// Values that fail to parse are ignored.
    pub fn load_with_env(path: &Path) -> anyhow::Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        override_string("MYPHAM_SERVER_HOST", &mut self.server.host);
        override_parsed("MYPHAM_SERVER_PORT", &mut self.server.port);
        override_string("MYPHAM_SERVER_CORS_ORIGIN", &mut self.server.cors_origin);

        override_string("MYPHAM_SESSION_COOKIE_NAME", &mut self.session.cookie_name);
        override_parsed("MYPHAM_SESSION_TTL_SECONDS", &mut self.session.ttl_seconds);
        override_parsed("MYPHAM_SESSION_SECURE", &mut self.session.secure);
        override_parsed(
            "MYPHAM_SESSION_CLEANUP_INTERVAL_SECONDS",
            &mut self.session.cleanup_interval_seconds,
        );

        override_parsed("MYPHAM_CACHE_ENABLED", &mut self.cache.enabled);
        override_parsed("MYPHAM_CACHE_TTL_SECONDS", &mut self.cache.ttl_seconds);
        override_parsed("MYPHAM_CACHE_MAX_CAPACITY", &mut self.cache.max_capacity);

        override_parsed("MYPHAM_ADMIN_REQUIRE_AUTH", &mut self.admin.require_auth);
        override_parsed(
            "MYPHAM_ADMIN_LOGIN_MAX_ATTEMPTS",
            &mut self.admin.login_max_attempts,
        );
        override_parsed(
            "MYPHAM_ADMIN_LOGIN_WINDOW_SECONDS",
            &mut self.admin.login_window_seconds,
        );

        override_parsed("MYPHAM_SEED_ENABLED", &mut self.seed.enabled);
        override_string("MYPHAM_SEED_ADMIN_USERNAME", &mut self.seed.admin_username);
        override_string("MYPHAM_SEED_ADMIN_PASSWORD", &mut self.seed.admin_password);
    }

    /// Reject values the server cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let cookie = &self.session.cookie_name;
        if cookie.is_empty()
            || !cookie
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(ConfigError::ValidationError(format!(
                "session.cookie_name '{}' must be non-empty ASCII letters, digits, '_' or '-'",
                cookie
            )));
        }
        if self.session.ttl_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "session.ttl_seconds must be greater than 0".to_string(),
            ));
        }
        if self.session.cleanup_interval_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "session.cleanup_interval_seconds must be greater than 0".to_string(),
            ));
        }
        if self.admin.login_max_attempts == 0 || self.admin.login_window_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "admin.login_max_attempts and admin.login_window_seconds must be greater than 0"
                    .to_string(),
            ));
        }
        if self.seed.enabled && self.seed.admin_username.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "seed.admin_username must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn override_string(key: &str, target: &mut String) {
    if let Ok(value) = std::env::var(key) {
        *target = value;
    }
}

fn override_parsed<T: std::str::FromStr>(key: &str, target: &mut T) {
    if let Ok(value) = std::env::var(key) {
        if let Ok(parsed) = value.trim().parse::<T>() {
            *target = parsed;
        }
    }
}

/// Format YAML parsing error with location and context
fn format_yaml_error(e: &serde_yaml::Error) -> String {
    if let Some(location) = e.location() {
        format!(
            "at line {}, column {}: {}",
            location.line(),
            location.column(),
            e
        )
    } else {
        e.to_string()
    }
}

// Shared by every test module that touches MYPHAM_* variables.
#[cfg(test)]
static CONFIG_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
const ENV_KEYS: [&str; 16] = [
    "MYPHAM_SERVER_HOST",
    "MYPHAM_SERVER_PORT",
    "MYPHAM_SERVER_CORS_ORIGIN",
    "MYPHAM_SESSION_COOKIE_NAME",
    "MYPHAM_SESSION_TTL_SECONDS",
    "MYPHAM_SESSION_SECURE",
    "MYPHAM_SESSION_CLEANUP_INTERVAL_SECONDS",
    "MYPHAM_CACHE_ENABLED",
    "MYPHAM_CACHE_TTL_SECONDS",
    "MYPHAM_CACHE_MAX_CAPACITY",
    "MYPHAM_ADMIN_REQUIRE_AUTH",
    "MYPHAM_ADMIN_LOGIN_MAX_ATTEMPTS",
    "MYPHAM_ADMIN_LOGIN_WINDOW_SECONDS",
    "MYPHAM_SEED_ENABLED",
    "MYPHAM_SEED_ADMIN_USERNAME",
    "MYPHAM_SEED_ADMIN_PASSWORD",
];

#[cfg(test)]
fn lock_clean_env() -> std::sync::MutexGuard<'static, ()> {
    let guard = CONFIG_ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    for key in ENV_KEYS {
        std::env::remove_var(key);
    }
    guard
}
