//! Session model
//!
//! A session is an anonymous browser identity. Its id doubles as the cart
//! partition key and becomes bound to a user after an admin login.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Browser session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Session ID (opaque token sent in the cookie)
    pub id: String,
    /// Logged-in user, if any
    pub user_id: Option<i64>,
    /// Expiration timestamp
    pub expires_at: DateTime<Utc>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Issue a fresh anonymous session valid for `ttl`.
    pub fn issue(ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: None,
            expires_at: now + ttl,
            created_at: now,
        }
    }

    /// Check if the session has expired
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_generates_unique_tokens() {
        let a = Session::issue(Duration::hours(24));
        let b = Session::issue(Duration::hours(24));
        assert_ne!(a.id, b.id);
        assert!(Uuid::parse_str(&a.id).is_ok());
        assert!(a.user_id.is_none());
        assert!(!a.is_expired());
    }

    #[test]
    fn test_expiry_boundary() {
        let session = Session::issue(Duration::seconds(60));
        assert!(!session.is_expired_at(session.expires_at - Duration::seconds(1)));
        assert!(session.is_expired_at(session.expires_at));
    }
}
