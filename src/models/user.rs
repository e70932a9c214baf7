//! User model
//!
//! Only administrators log in; shoppers stay anonymous.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Back-office user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Login name, unique
    pub username: String,
    /// Argon2 PHC string, never serialized
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub is_admin: bool,
}

impl User {
    /// Create a new User. The ID is assigned by the repository.
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>, is_admin: bool) -> Self {
        Self {
            id: 0,
            username: username.into(),
            password_hash: password_hash.into(),
            is_admin,
        }
    }
}

/// Body of `POST /auth/login`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginInput {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User::new("admin", "$argon2id$v=19$secret", true);
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["isAdmin"], true);
        assert_eq!(json["username"], "admin");
    }
}
