//! Cart service
//!
//! Session-scoped shopping cart. The session id is trusted as given: whoever
//! presents it owns the cart. A line owned by another session is reported
//! exactly like an unknown line so ids cannot be probed across sessions.
//!
//! Cart state machine per (session, product):
//! absent -> present(n) on add; present(n) -> present(n + k) on repeated add;
//! present(n) -> present(m >= 1) on update; present -> absent on remove/clear.

use crate::db::repositories::{CartItemRepository, CartMerge, ProductRepository};
use crate::models::{CartItem, CartLine, CartSummary};
use anyhow::Context;
use std::sync::Arc;

use super::ServiceError;

/// Cart service
pub struct CartService {
    items: Arc<dyn CartItemRepository>,
    products: Arc<dyn ProductRepository>,
}

impl CartService {
    pub fn new(items: Arc<dyn CartItemRepository>, products: Arc<dyn ProductRepository>) -> Self {
        Self { items, products }
    }

    /// Add `quantity` units of a product, merging into the existing line.
    ///
    /// # Errors
    /// - `Validation` when `quantity < 1` or the merged quantity overflows
    /// - `NotFound` when the product does not exist
    pub async fn add_item(
        &self,
        session_id: &str,
        product_id: i64,
        quantity: i64,
    ) -> Result<CartItem, ServiceError> {
        check_quantity(quantity)?;

        let exists = self
            .products
            .get_by_id(product_id)
            .await
            .context("Failed to get product")?
            .is_some();
        if !exists {
            return Err(ServiceError::not_found("Product", product_id));
        }

        match self
            .items
            .add_or_merge(session_id, product_id, quantity)
            .await
            .context("Failed to add cart item")?
        {
            CartMerge::Created(item) => {
                tracing::debug!(item_id = item.id, product_id, quantity, "Cart line created");
                Ok(item)
            }
            CartMerge::Merged(item) => {
                tracing::debug!(item_id = item.id, product_id, total = item.quantity, "Cart line merged");
                Ok(item)
            }
            CartMerge::Overflow { current } => Err(ServiceError::invalid(
                "quantity",
                format!("Quantity too large; the cart already holds {}", current),
            )),
        }
    }

    /// Set the quantity of one of the session's lines.
    ///
    /// Returns `Ok(None)` for unknown or foreign lines, checked before the
    /// quantity so a foreign id never reveals anything.
    ///
    /// # Errors
    /// - `Validation` when `quantity < 1`; the stored line is left unchanged
    pub async fn update_item(
        &self,
        session_id: &str,
        id: i64,
        quantity: i64,
    ) -> Result<Option<CartItem>, ServiceError> {
        let owned = self
            .items
            .get_by_id(id)
            .await
            .context("Failed to get cart item")?
            .is_some_and(|item| item.is_owned_by(session_id));
        if !owned {
            return Ok(None);
        }
        check_quantity(quantity)?;

        Ok(self
            .items
            .update_quantity(id, session_id, quantity)
            .await
            .context("Failed to update cart item")?)
    }

    /// Remove one of the session's lines; false for unknown or foreign lines
    pub async fn remove_item(&self, session_id: &str, id: i64) -> Result<bool, ServiceError> {
        Ok(self
            .items
            .delete(id, session_id)
            .await
            .context("Failed to remove cart item")?)
    }

    /// Remove every line of the session. Idempotent.
    pub async fn clear(&self, session_id: &str) -> Result<usize, ServiceError> {
        Ok(self
            .items
            .clear(session_id)
            .await
            .context("Failed to clear cart")?)
    }

    /// Take checked-out lines out of the cart. Quantity added to a line after
    /// `lines` were read stays in the cart, as do lines added since.
    pub async fn remove_ordered(&self, session_id: &str, lines: &[CartLine]) -> Result<usize, ServiceError> {
        let ordered: Vec<CartItem> = lines.iter().map(|line| line.item.clone()).collect();
        Ok(self
            .items
            .remove_ordered(session_id, &ordered)
            .await
            .context("Failed to remove ordered cart items")?)
    }

    /// Lines of the session joined with live product data, in insertion order.
    ///
    /// # Errors
    /// - `Integrity` when any line references a missing product; no partial
    ///   result is returned
    pub async fn list_with_products(&self, session_id: &str) -> Result<Vec<CartLine>, ServiceError> {
        let items = self
            .items
            .list_by_session(session_id)
            .await
            .context("Failed to list cart items")?;

        let mut lines = Vec::with_capacity(items.len());
        for item in items {
            let product = self
                .products
                .get_by_id(item.product_id)
                .await
                .context("Failed to get product")?
                .ok_or_else(|| {
                    tracing::error!(item_id = item.id, product_id = item.product_id, "Cart line references a missing product");
                    ServiceError::Integrity(format!(
                        "Cart item {} references missing product {}",
                        item.id, item.product_id
                    ))
                })?;
            lines.push(CartLine { item, product });
        }
        Ok(lines)
    }

    /// Joined lines with item count and totals
    ///
    /// # Errors
    /// - `Integrity` as for [`Self::list_with_products`]
    /// - `Validation` on field `cart` when the totals do not fit in an `i64`
    pub async fn summary(&self, session_id: &str) -> Result<CartSummary, ServiceError> {
        let lines = self.list_with_products(session_id).await?;
        CartSummary::from_lines(lines)
            .ok_or_else(|| ServiceError::invalid("cart", "Cart totals are too large"))
    }
}

fn check_quantity(quantity: i64) -> Result<(), ServiceError> {
    if quantity < 1 {
        return Err(ServiceError::invalid("quantity", "Quantity must be at least 1"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{MemoryCartItemRepository, MemoryProductRepository};
    use crate::models::{CreateProductInput, Product};
    use proptest::prelude::*;

    struct Fixture {
        service: CartService,
        products: Arc<dyn ProductRepository>,
        items: Arc<dyn CartItemRepository>,
    }

    fn setup() -> Fixture {
        let products = MemoryProductRepository::boxed();
        let items = MemoryCartItemRepository::boxed();
        Fixture {
            service: CartService::new(items.clone(), products.clone()),
            products,
            items,
        }
    }

    async fn add_product(f: &Fixture, name: &str, price: i64, sale_price: Option<i64>) -> Product {
        let mut input = CreateProductInput::new(name, price, 1);
        input.sale_price = sale_price;
        f.products
            .create(&input.into_product(name.to_lowercase()))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_two_sessions_scenario() {
        let f = setup();
        let p1 = add_product(&f, "P1", 100, None).await;
        let p2 = add_product(&f, "P2", 200, None).await;

        let first = f.service.add_item("sess-A", p1.id, 2).await.unwrap();
        let merged = f.service.add_item("sess-A", p1.id, 3).await.unwrap();
        assert_eq!(merged.id, first.id);
        assert_eq!(merged.quantity, 5);

        f.service.add_item("sess-B", p2.id, 1).await.unwrap();

        let a = f.service.list_with_products("sess-A").await.unwrap();
        assert_eq!(a.len(), 1);
        assert_eq!(a[0].item.quantity, 5);
        assert_eq!(a[0].product, p1);

        let b = f.service.list_with_products("sess-B").await.unwrap();
        assert_eq!(b.len(), 1);
        assert_eq!(b[0].product, p2);

        // Foreign line behaves as unknown
        assert!(f.service.update_item("sess-B", first.id, 1).await.unwrap().is_none());
        assert!(!f.service.remove_item("sess-B", first.id).await.unwrap());
        assert_eq!(f.service.list_with_products("sess-A").await.unwrap()[0].item.quantity, 5);
    }

    #[tokio::test]
    async fn test_update_to_zero_scenario() {
        let f = setup();
        let p1 = add_product(&f, "P1", 100, None).await;
        let item = f.service.add_item("sess-A", p1.id, 5).await.unwrap();

        // Foreign session: not found, even with an invalid quantity
        assert!(f.service.update_item("sess-B", item.id, 0).await.unwrap().is_none());

        // Owner: rejected, quantity unchanged
        let err = f.service.update_item("sess-A", item.id, 0).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(f.items.get_by_id(item.id).await.unwrap().unwrap().quantity, 5);

        let updated = f.service.update_item("sess-A", item.id, 2).await.unwrap().unwrap();
        assert_eq!(updated.quantity, 2);
    }

    #[tokio::test]
    async fn test_add_rejects_non_positive_quantity() {
        let f = setup();
        let p1 = add_product(&f, "P1", 100, None).await;
        for quantity in [0, -3] {
            let err = f.service.add_item("sess-A", p1.id, quantity).await.unwrap_err();
            assert!(matches!(err, ServiceError::Validation(_)));
        }
        assert!(f.service.list_with_products("sess-A").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_unknown_product_not_found() {
        let f = setup();
        let err = f.service.add_item("sess-A", 404, 1).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_add_overflow_rejected() {
        let f = setup();
        let p1 = add_product(&f, "P1", 100, None).await;
        f.service.add_item("sess-A", p1.id, i64::MAX).await.unwrap();
        let err = f.service.add_item("sess-A", p1.id, 1).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_summary_rejects_overflowing_totals() {
        let f = setup();
        let a = add_product(&f, "A", 1, None).await;
        let b = add_product(&f, "B", 1, None).await;
        f.service.add_item("s", a.id, i64::MAX).await.unwrap();
        f.service.add_item("s", b.id, i64::MAX).await.unwrap();

        match f.service.summary("s").await.unwrap_err() {
            ServiceError::Validation(errors) => assert_eq!(errors[0].field, "cart"),
            other => panic!("unexpected error: {other:?}"),
        }
        // The cart itself is still readable
        assert_eq!(f.service.list_with_products("s").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_product_fails_whole_read() {
        let f = setup();
        let p1 = add_product(&f, "P1", 100, None).await;
        let p2 = add_product(&f, "P2", 100, None).await;
        f.service.add_item("sess-A", p1.id, 1).await.unwrap();
        f.service.add_item("sess-A", p2.id, 1).await.unwrap();

        // Bypass the product service so the cart line is left dangling
        f.products.delete(p2.id).await.unwrap();

        let err = f.service.list_with_products("sess-A").await.unwrap_err();
        assert!(matches!(err, ServiceError::Integrity(_)));
        assert!(matches!(
            f.service.summary("sess-A").await.unwrap_err(),
            ServiceError::Integrity(_)
        ));
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let f = setup();
        let p1 = add_product(&f, "P1", 100, None).await;
        f.service.add_item("sess-A", p1.id, 1).await.unwrap();
        f.service.add_item("sess-B", p1.id, 1).await.unwrap();

        assert_eq!(f.service.clear("sess-A").await.unwrap(), 1);
        assert_eq!(f.service.clear("sess-A").await.unwrap(), 0);
        assert!(f.service.list_with_products("sess-A").await.unwrap().is_empty());
        assert_eq!(f.service.list_with_products("sess-B").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_summary_totals() {
        let f = setup();
        let kem = add_product(&f, "Kem", 500_000, Some(420_000)).await;
        let serum = add_product(&f, "Serum", 590_000, None).await;
        f.service.add_item("sess-A", kem.id, 2).await.unwrap();
        f.service.add_item("sess-A", serum.id, 1).await.unwrap();

        let summary = f.service.summary("sess-A").await.unwrap();
        assert_eq!(summary.item_count, 3);
        assert_eq!(summary.subtotal, 1_430_000);
        assert_eq!(summary.shipping, 0);
        assert_eq!(summary.total, 1_430_000);
    }

    #[tokio::test]
    async fn test_list_keeps_insertion_order() {
        let f = setup();
        let a = add_product(&f, "A", 1, None).await;
        let b = add_product(&f, "B", 1, None).await;
        f.service.add_item("sess-A", b.id, 1).await.unwrap();
        f.service.add_item("sess-A", a.id, 1).await.unwrap();
        f.service.add_item("sess-A", b.id, 1).await.unwrap();

        let ids: Vec<_> = f
            .service
            .list_with_products("sess-A")
            .await
            .unwrap()
            .into_iter()
            .map(|line| line.product.id)
            .collect();
        assert_eq!(ids, vec![b.id, a.id]);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(20))]

        /// Any update below 1 is rejected and leaves the stored quantity alone.
        #[test]
        fn update_below_one_never_changes_quantity(initial in 1i64..100, bad in -100i64..1) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let result: Result<(), TestCaseError> = rt.block_on(async {
                let f = setup();
                let product = add_product(&f, "P", 10, None).await;
                let item = f.service.add_item("sess", product.id, initial).await.unwrap();

                let outcome = f.service.update_item("sess", item.id, bad).await;
                prop_assert!(matches!(outcome, Err(ServiceError::Validation(_))));
                let stored = f.items.get_by_id(item.id).await.unwrap().unwrap();
                prop_assert_eq!(stored.quantity, initial);
                Ok(())
            });
            result?;
        }
    }
}
