//! Contact form and newsletter payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body of `POST /contact`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ContactInput {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(max = 200, message = "Subject is too long"))]
    pub subject: Option<String>,
    #[validate(length(min = 1, max = 5000, message = "Message is required"))]
    pub message: String,
}

/// A received contact message
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
    pub received_at: DateTime<Utc>,
}

/// Body of `POST /newsletter`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewsletterInput {
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_is_optional() {
        let input: ContactInput = serde_json::from_str(
            r#"{"name": "Lan", "email": "lan@example.com", "message": "Xin chào"}"#,
        )
        .unwrap();
        assert!(input.validate().is_ok());
        assert!(input.subject.is_none());
    }

    #[test]
    fn test_empty_message_rejected() {
        let input: ContactInput =
            serde_json::from_str(r#"{"name": "Lan", "email": "lan@example.com", "message": ""}"#)
                .unwrap();
        assert!(input.validate().is_err());
    }
}
