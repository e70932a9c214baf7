//! Contact form and newsletter
//!
//! Messages and subscriptions are kept in memory for the process lifetime.

use crate::models::{ContactInput, ContactMessage, NewsletterInput};
use chrono::Utc;
use std::collections::HashSet;
use tokio::sync::RwLock;
use validator::Validate;

use super::ServiceError;

#[derive(Default)]
struct Inbox {
    messages: Vec<ContactMessage>,
    subscribers: HashSet<String>,
}

/// Contact service
#[derive(Default)]
pub struct ContactService {
    inbox: RwLock<Inbox>,
}

impl ContactService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a contact message.
    pub async fn submit(&self, input: ContactInput) -> Result<ContactMessage, ServiceError> {
        input.validate()?;

        let mut inbox = self.inbox.write().await;
        let message = ContactMessage {
            id: inbox.messages.len() as i64 + 1,
            name: input.name,
            email: input.email,
            subject: input.subject.filter(|s| !s.trim().is_empty()),
            message: input.message,
            received_at: Utc::now(),
        };
        inbox.messages.push(message.clone());

        tracing::info!(id = message.id, email = %message.email, "Contact message received");
        Ok(message)
    }

    /// Subscribe an email. Returns `true` for a new subscriber and `false`
    /// when the address was already subscribed.
    pub async fn subscribe(&self, input: NewsletterInput) -> Result<bool, ServiceError> {
        input.validate()?;

        let email = input.email.trim().to_lowercase();
        let added = self.inbox.write().await.subscribers.insert(email);
        if added {
            tracing::info!("Newsletter subscriber added");
        }
        Ok(added)
    }

    pub async fn messages(&self) -> Vec<ContactMessage> {
        self.inbox.read().await.messages.clone()
    }

    pub async fn message_count(&self) -> usize {
        self.inbox.read().await.messages.len()
    }

    pub async fn subscriber_count(&self) -> usize {
        self.inbox.read().await.subscribers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn newsletter(email: &str) -> NewsletterInput {
        NewsletterInput {
            email: email.to_string(),
        }
    }

    #[tokio::test]
    async fn test_submit_assigns_ids() {
        let service = ContactService::new();
        let input = ContactInput {
            name: "Lan".to_string(),
            email: "lan@example.com".to_string(),
            subject: Some("  ".to_string()),
            message: "Cho mình hỏi về son dưỡng".to_string(),
        };
        let first = service.submit(input.clone()).await.unwrap();
        let second = service.submit(input).await.unwrap();
        assert_eq!((first.id, second.id), (1, 2));
        assert!(first.subject.is_none());
        assert_eq!(service.messages().await.len(), 2);
    }

    #[tokio::test]
    async fn test_submit_invalid_rejected() {
        let service = ContactService::new();
        let input = ContactInput {
            name: String::new(),
            email: "lan@example.com".to_string(),
            subject: None,
            message: "x".to_string(),
        };
        assert!(matches!(
            service.submit(input).await,
            Err(ServiceError::Validation(_))
        ));
        assert_eq!(service.message_count().await, 0);
    }

    #[tokio::test]
    async fn test_subscribe_is_idempotent_ignoring_case() {
        let service = ContactService::new();
        assert!(service.subscribe(newsletter("Lan@Example.com")).await.unwrap());
        assert!(!service.subscribe(newsletter("lan@example.com")).await.unwrap());
        assert_eq!(service.subscriber_count().await, 1);
        assert!(service.subscribe(newsletter("nope")).await.is_err());
    }
}
