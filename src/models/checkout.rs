//! Checkout payloads
//!
//! Checkout is simulated: no payment is taken and no order is persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::CartLine;

/// How the customer intends to pay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash on delivery
    #[default]
    Cod,
    /// Bank transfer
    Bank,
}

/// Body of `POST /checkout`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutInput {
    #[validate(length(min = 1, max = 100, message = "Full name is required"))]
    pub full_name: String,
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    #[validate(length(min = 8, max = 20, message = "A valid phone number is required"))]
    pub phone: String,
    #[validate(length(min = 1, max = 300, message = "Address is required"))]
    pub address: String,
    #[validate(length(min = 1, max = 100, message = "City is required"))]
    pub city: String,
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default)]
    #[validate(length(max = 1000, message = "Notes are too long"))]
    pub notes: Option<String>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

/// Result of a successful checkout.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    pub order_number: String,
    pub full_name: String,
    pub email: String,
    pub payment_method: PaymentMethod,
    pub items: Vec<CartLine>,
    pub item_count: i64,
    pub subtotal: i64,
    pub shipping: i64,
    pub total: i64,
    pub placed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input_json() -> serde_json::Value {
        serde_json::json!({
            "fullName": "Nguyễn Thị Lan",
            "email": "lan@example.com",
            "phone": "0901234567",
            "address": "12 Lê Lợi",
            "city": "Hồ Chí Minh"
        })
    }

    #[test]
    fn test_minimal_input_is_valid_and_defaults_to_cod() {
        let input: CheckoutInput = serde_json::from_value(input_json()).unwrap();
        assert!(input.validate().is_ok());
        assert_eq!(input.payment_method, PaymentMethod::Cod);
    }

    #[test]
    fn test_bad_email_rejected() {
        let mut json = input_json();
        json["email"] = "not-an-email".into();
        let input: CheckoutInput = serde_json::from_value(json).unwrap();
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn test_unknown_payment_method_rejected() {
        let mut json = input_json();
        json["paymentMethod"] = "card".into();
        assert!(serde_json::from_value::<CheckoutInput>(json).is_err());
    }
}
