//! In-memory tables
//!
//! Every repository in this crate stores its records in a `MemoryTable`: a
//! `BTreeMap` keyed by identity behind a `tokio::sync::RwLock`. Identities
//! start at 1, increase monotonically and are never reused, so iterating the
//! map yields insertion order.
//!
//! Compound operations (find-then-write) take the write guard once through
//! [`MemoryTable::write`] so they are atomic with respect to other callers.

use std::collections::BTreeMap;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A record with a table-assigned integer identity.
pub trait Record: Clone + Send + Sync + 'static {
    fn id(&self) -> i64;
    fn assign_id(&mut self, id: i64);
}

/// Table contents. Only reachable through a lock guard.
#[derive(Debug)]
pub struct Rows<T> {
    rows: BTreeMap<i64, T>,
    next_id: i64,
}

impl<T: Record> Rows<T> {
    fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Assign the next identity and store the record.
    pub fn insert(&mut self, mut record: T) -> T {
        let id = self.next_id;
        self.next_id += 1;
        record.assign_id(id);
        self.rows.insert(id, record.clone());
        record
    }

    pub fn get(&self, id: i64) -> Option<&T> {
        self.rows.get(&id)
    }

    pub fn get_mut(&mut self, id: i64) -> Option<&mut T> {
        self.rows.get_mut(&id)
    }

    pub fn remove(&mut self, id: i64) -> Option<T> {
        self.rows.remove(&id)
    }

    /// Records in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.rows.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.rows.values_mut()
    }

    /// Keep only the records matching `keep`; returns how many were removed.
    pub fn retain<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        let before = self.rows.len();
        self.rows.retain(|_, record| keep(record));
        before - self.rows.len()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Lock-guarded in-memory table.
#[derive(Debug)]
pub struct MemoryTable<T> {
    inner: RwLock<Rows<T>>,
}

impl<T: Record> Default for MemoryTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> MemoryTable<T> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Rows::new()),
        }
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, Rows<T>> {
        self.inner.read().await
    }

    pub async fn write(&self) -> RwLockWriteGuard<'_, Rows<T>> {
        self.inner.write().await
    }

    pub async fn insert(&self, record: T) -> T {
        self.write().await.insert(record)
    }

    pub async fn get(&self, id: i64) -> Option<T> {
        self.read().await.get(id).cloned()
    }

    pub async fn list(&self) -> Vec<T> {
        self.read().await.iter().cloned().collect()
    }

    /// First record matching `pred`, in insertion order.
    pub async fn find<F>(&self, pred: F) -> Option<T>
    where
        F: Fn(&T) -> bool + Send,
    {
        self.read().await.iter().find(|record| pred(record)).cloned()
    }

    pub async fn filter<F>(&self, pred: F) -> Vec<T>
    where
        F: Fn(&T) -> bool + Send,
    {
        self.read()
            .await
            .iter()
            .filter(|record| pred(record))
            .cloned()
            .collect()
    }

    pub async fn count<F>(&self, pred: F) -> usize
    where
        F: Fn(&T) -> bool + Send,
    {
        self.read().await.iter().filter(|record| pred(record)).count()
    }

    pub async fn any<F>(&self, pred: F) -> bool
    where
        F: Fn(&T) -> bool + Send,
    {
        self.read().await.iter().any(|record| pred(record))
    }

    /// Apply `change` to the record with `id` under the write lock.
    pub async fn update<F>(&self, id: i64, change: F) -> Option<T>
    where
        F: FnOnce(&mut T) + Send,
    {
        let mut rows = self.write().await;
        let record = rows.get_mut(id)?;
        change(record);
        Some(record.clone())
    }

    pub async fn remove(&self, id: i64) -> bool {
        self.write().await.remove(id).is_some()
    }

    /// Remove every record matching `pred`; returns how many were removed.
    pub async fn remove_where<F>(&self, pred: F) -> usize
    where
        F: Fn(&T) -> bool + Send,
    {
        self.write().await.retain(|record| !pred(record))
    }

    pub async fn len(&self) -> usize {
        self.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: i64,
        name: String,
    }

    impl Record for Row {
        fn id(&self) -> i64 {
            self.id
        }

        fn assign_id(&mut self, id: i64) {
            self.id = id;
        }
    }

    fn row(name: &str) -> Row {
        Row {
            id: 0,
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_ids_start_at_one_and_increase() {
        let table = MemoryTable::new();
        assert_eq!(table.insert(row("a")).await.id, 1);
        assert_eq!(table.insert(row("b")).await.id, 2);
    }

    #[tokio::test]
    async fn test_ids_never_reused_after_delete() {
        let table = MemoryTable::new();
        let a = table.insert(row("a")).await;
        let b = table.insert(row("b")).await;
        assert!(table.remove(b.id).await);
        assert!(table.remove(a.id).await);
        assert_eq!(table.insert(row("c")).await.id, 3);
    }

    #[tokio::test]
    async fn test_list_keeps_insertion_order() {
        let table = MemoryTable::new();
        for name in ["c", "a", "b"] {
            table.insert(row(name)).await;
        }
        let names: Vec<_> = table.list().await.into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn test_update_missing_returns_none() {
        let table: MemoryTable<Row> = MemoryTable::new();
        assert!(table.update(7, |r| r.name.push('!')).await.is_none());
        assert!(!table.remove(7).await);
    }

    #[tokio::test]
    async fn test_remove_where_counts() {
        let table = MemoryTable::new();
        for name in ["x", "y", "x"] {
            table.insert(row(name)).await;
        }
        assert_eq!(table.remove_where(|r| r.name == "x").await, 2);
        assert_eq!(table.len().await, 1);
        assert_eq!(table.remove_where(|r| r.name == "x").await, 0);
    }
}
