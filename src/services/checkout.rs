//! Checkout service
//!
//! Simulated checkout: validates the shipping form, prices the session's cart
//! and returns an order confirmation. Nothing is charged or persisted.

use crate::models::{CheckoutInput, OrderConfirmation};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use super::cart::CartService;
use super::ServiceError;

const ORDER_PREFIX: &str = "MP-";

pub struct CheckoutService {
    cart: Arc<CartService>,
}

impl CheckoutService {
    pub fn new(cart: Arc<CartService>) -> Self {
        Self { cart }
    }

    /// Place an order for everything in the session's cart.
    ///
    /// # Errors
    /// - `Validation` for a bad shipping form or an empty cart (field `cart`)
    /// - `Integrity` when a cart line references a missing product
    pub async fn place_order(
        &self,
        session_id: &str,
        input: CheckoutInput,
    ) -> Result<OrderConfirmation, ServiceError> {
        input.validate()?;

        let summary = self.cart.summary(session_id).await?;
        if summary.is_empty() {
            return Err(ServiceError::invalid("cart", "Cart is empty"));
        }

        // Quantity added after pricing stays in the cart; a leftover cart is
        // not fatal to the order.
        if let Err(e) = self.cart.remove_ordered(session_id, &summary.items).await {
            tracing::warn!(error = %e, "Failed to clear cart after checkout");
        }

        let confirmation = OrderConfirmation {
            order_number: order_number(),
            full_name: input.full_name,
            email: input.email,
            payment_method: input.payment_method,
            items: summary.items,
            item_count: summary.item_count,
            subtotal: summary.subtotal,
            shipping: summary.shipping,
            total: summary.total,
            placed_at: Utc::now(),
        };

        tracing::info!(
            order_number = %confirmation.order_number,
            items = confirmation.item_count,
            total = confirmation.total,
            "Order placed"
        );
        Ok(confirmation)
    }
}

fn order_number() -> String {
    let id = Uuid::new_v4().simple().to_string().to_uppercase();
    format!("{}{}", ORDER_PREFIX, &id[..8])
}
