//! Cart model
//!
//! A cart is the set of line items sharing one session id. There is no cart
//! entity of its own.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::Product;

/// One product line in a session's cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Unique identifier
    pub id: i64,
    /// Owning session (cart partition key)
    pub session_id: String,
    pub product_id: i64,
    /// Always at least 1
    pub quantity: i64,
}

impl CartItem {
    pub fn new(session_id: impl Into<String>, product_id: i64, quantity: i64) -> Self {
        Self {
            id: 0,
            session_id: session_id.into(),
            product_id,
            quantity,
        }
    }

    pub fn is_owned_by(&self, session_id: &str) -> bool {
        self.session_id == session_id
    }
}

/// Body of `POST /cart`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddCartItemInput {
    pub product_id: i64,
    #[serde(default = "default_quantity")]
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

/// Body of `PUT /cart/{id}`
///
/// The quantity floor is checked by the cart service after the ownership
/// check, so a foreign line id reports not-found even with a bad quantity.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartItemInput {
    pub quantity: i64,
}

/// Cart line joined with its live product record.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    #[serde(flatten)]
    pub item: CartItem,
    pub product: Product,
}

impl CartLine {
    /// Effective unit price times quantity; `None` on overflow.
    pub fn line_total(&self) -> Option<i64> {
        self.product.effective_price().checked_mul(self.item.quantity)
    }
}

/// Cart contents with totals.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub items: Vec<CartLine>,
    /// Sum of quantities
    pub item_count: i64,
    pub subtotal: i64,
    /// Shipping is free for every order
    pub shipping: i64,
    pub total: i64,
}

impl CartSummary {
    /// Total up the lines. Returns `None` when the item count or any amount
    /// does not fit in an `i64`.
    pub fn from_lines(items: Vec<CartLine>) -> Option<Self> {
        let mut item_count = 0i64;
        let mut subtotal = 0i64;
        for line in &items {
            item_count = item_count.checked_add(line.item.quantity)?;
            subtotal = subtotal.checked_add(line.line_total()?)?;
        }
        let shipping = 0;
        Some(Self {
            items,
            item_count,
            subtotal,
            shipping,
            total: subtotal.checked_add(shipping)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreateProductInput;

    fn line(price: i64, sale_price: Option<i64>, quantity: i64) -> CartLine {
        let mut input = CreateProductInput::new("P", price, 1);
        input.sale_price = sale_price;
        CartLine {
            item: CartItem::new("sess", 1, quantity),
            product: input.into_product("p".into()),
        }
    }

    #[test]
    fn test_line_serializes_flat_with_product() {
        let json = serde_json::to_value(line(100, None, 2)).unwrap();
        assert_eq!(json["sessionId"], "sess");
        assert_eq!(json["quantity"], 2);
        assert_eq!(json["product"]["price"], 100);
    }

    #[test]
    fn test_summary_uses_sale_price() {
        let summary = CartSummary::from_lines(vec![
            line(500_000, Some(420_000), 2),
            line(590_000, None, 1),
        ])
        .unwrap();
        assert_eq!(summary.item_count, 3);
        assert_eq!(summary.subtotal, 2 * 420_000 + 590_000);
        assert_eq!(summary.shipping, 0);
        assert_eq!(summary.total, summary.subtotal);
    }

    #[test]
    fn test_empty_summary() {
        let summary = CartSummary::from_lines(Vec::new()).unwrap();
        assert!(summary.is_empty());
        assert_eq!(summary.total, 0);
    }

    #[test]
    fn test_summary_out_of_range_is_none() {
        // Each quantity is fine on its own, the count is not
        assert!(CartSummary::from_lines(vec![line(1, None, i64::MAX), line(1, None, i64::MAX)]).is_none());
        // Price times quantity
        assert!(CartSummary::from_lines(vec![line(590_000, None, i64::MAX / 2)]).is_none());
        // Subtotal across lines
        assert!(CartSummary::from_lines(vec![line(i64::MAX, None, 1), line(1, None, 1)]).is_none());
    }

    #[test]
    fn test_add_input_defaults_quantity() {
        let input: AddCartItemInput = serde_json::from_str(r#"{"productId": 3}"#).unwrap();
        assert_eq!(input.quantity, 1);
        assert!(input.validate().is_ok());

        let input: AddCartItemInput =
            serde_json::from_str(r#"{"productId": 3, "quantity": 0}"#).unwrap();
        assert!(input.validate().is_err());
    }
}
