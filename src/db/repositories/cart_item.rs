//! Cart item repository
//!
//! Cart lines are partitioned by session id. Merge-on-add and the
//! ownership-checked update/delete each run under one write-lock acquisition,
//! so concurrent requests for the same session never lose an update.

use crate::db::memory::{MemoryTable, Record};
use crate::models::CartItem;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Outcome of [`CartItemRepository::add_or_merge`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartMerge {
    /// No line existed for the product; a new one was inserted
    Created(CartItem),
    /// The quantity was added to the existing line
    Merged(CartItem),
    /// The sum does not fit; the stored line is unchanged
    Overflow { current: i64 },
}

impl CartMerge {
    pub fn item(&self) -> Option<&CartItem> {
        match self {
            CartMerge::Created(item) | CartMerge::Merged(item) => Some(item),
            CartMerge::Overflow { .. } => None,
        }
    }
}

/// Cart item repository trait
#[async_trait]
pub trait CartItemRepository: Send + Sync {
    /// Lines of one session in insertion order
    async fn list_by_session(&self, session_id: &str) -> Result<Vec<CartItem>>;

    async fn get_by_id(&self, id: i64) -> Result<Option<CartItem>>;

    /// Line for (session, product), if any
    async fn find_by_product(&self, session_id: &str, product_id: i64) -> Result<Option<CartItem>>;

    /// Add `quantity` to the session's line for the product, inserting the
    /// line if it does not exist yet
    async fn add_or_merge(&self, session_id: &str, product_id: i64, quantity: i64)
        -> Result<CartMerge>;

    /// Set the quantity of a line owned by `session_id`. A line owned by
    /// another session is treated as absent.
    async fn update_quantity(&self, id: i64, session_id: &str, quantity: i64)
        -> Result<Option<CartItem>>;

    /// Delete a line owned by `session_id`; false if absent or foreign
    async fn delete(&self, id: i64, session_id: &str) -> Result<bool>;

    /// Delete every line of the session; returns how many were removed
    async fn clear(&self, session_id: &str) -> Result<usize>;

    /// Take `ordered` out of the session's cart: a line still holding the
    /// ordered quantity or less is deleted, a line that grew since keeps the
    /// difference. Returns how many lines were deleted.
    async fn remove_ordered(&self, session_id: &str, ordered: &[CartItem]) -> Result<usize>;

    /// Delete every line referencing the product, across all sessions
    async fn delete_by_product(&self, product_id: i64) -> Result<usize>;

    async fn count(&self) -> Result<usize>;
}

impl Record for CartItem {
    fn id(&self) -> i64 {
        self.id
    }

    fn assign_id(&mut self, id: i64) {
        self.id = id;
    }
}

/// In-memory cart item repository
#[derive(Default)]
pub struct MemoryCartItemRepository {
    table: MemoryTable<CartItem>,
}

impl MemoryCartItemRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed() -> Arc<dyn CartItemRepository> {
        Arc::new(Self::new())
    }
}

#[async_trait]
impl CartItemRepository for MemoryCartItemRepository {
    async fn list_by_session(&self, session_id: &str) -> Result<Vec<CartItem>> {
        Ok(self.table.filter(|item| item.is_owned_by(session_id)).await)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<CartItem>> {
        Ok(self.table.get(id).await)
    }

    async fn find_by_product(&self, session_id: &str, product_id: i64) -> Result<Option<CartItem>> {
        Ok(self
            .table
            .find(|item| item.is_owned_by(session_id) && item.product_id == product_id)
            .await)
    }

    async fn add_or_merge(
        &self,
        session_id: &str,
        product_id: i64,
        quantity: i64,
    ) -> Result<CartMerge> {
        let mut rows = self.table.write().await;

        let existing = rows
            .iter_mut()
            .find(|item| item.is_owned_by(session_id) && item.product_id == product_id);
        if let Some(item) = existing {
            return Ok(match item.quantity.checked_add(quantity) {
                Some(total) => {
                    item.quantity = total;
                    CartMerge::Merged(item.clone())
                }
                None => CartMerge::Overflow {
                    current: item.quantity,
                },
            });
        }

        Ok(CartMerge::Created(
            rows.insert(CartItem::new(session_id, product_id, quantity)),
        ))
    }

    async fn update_quantity(
        &self,
        id: i64,
        session_id: &str,
        quantity: i64,
    ) -> Result<Option<CartItem>> {
        let mut rows = self.table.write().await;
        Ok(rows
            .get_mut(id)
            .filter(|item| item.is_owned_by(session_id))
            .map(|item| {
                item.quantity = quantity;
                item.clone()
            }))
    }

    async fn delete(&self, id: i64, session_id: &str) -> Result<bool> {
        let mut rows = self.table.write().await;
        let owned = rows.get(id).is_some_and(|item| item.is_owned_by(session_id));
        if owned {
            rows.remove(id);
        }
        Ok(owned)
    }

    async fn clear(&self, session_id: &str) -> Result<usize> {
        Ok(self
            .table
            .remove_where(|item| item.is_owned_by(session_id))
            .await)
    }

    async fn remove_ordered(&self, session_id: &str, ordered: &[CartItem]) -> Result<usize> {
        let mut rows = self.table.write().await;
        let mut removed = 0;
        for line in ordered {
            let Some(item) = rows
                .get_mut(line.id)
                .filter(|item| item.is_owned_by(session_id))
            else {
                continue;
            };
            if item.quantity > line.quantity {
                item.quantity -= line.quantity;
            } else {
                rows.remove(line.id);
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn delete_by_product(&self, product_id: i64) -> Result<usize> {
        Ok(self
            .table
            .remove_where(|item| item.product_id == product_id)
            .await)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.table.len().await)
    }
}
