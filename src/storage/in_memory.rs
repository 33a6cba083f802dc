//! In-memory implementation of OrderStore for testing and development

use crate::core::order::{Order, OrderDraft};
use crate::core::store::OrderStore;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

#[derive(Default)]
struct Inner {
    orders: BTreeMap<u64, Order>,
    last_id: u64,
}

/// In-memory order store
///
/// Ids start at 1 and are never reused, even after deletion. Uses RwLock for
/// thread-safe access.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryOrderStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, draft: OrderDraft) -> Result<Order> {
        let mut inner = self
            .inner
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        inner.last_id += 1;
        let order = Order::from_draft(inner.last_id, draft, Utc::now());
        inner.orders.insert(order.id, order.clone());

        Ok(order)
    }

    async fn get(&self, id: u64) -> Result<Option<Order>> {
        let inner = self
            .inner
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(inner.orders.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Order>> {
        let inner = self
            .inner
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        let mut orders: Vec<Order> = inner.orders.values().cloned().collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(orders)
    }

    async fn update(&self, id: u64, draft: OrderDraft) -> Result<Option<Order>> {
        let mut inner = self
            .inner
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let Some(order) = inner.orders.get_mut(&id) else {
            return Ok(None);
        };

        order.apply_draft(draft);
        order.updated_at = Utc::now().max(order.updated_at);

        Ok(Some(order.clone()))
    }

    async fn delete(&self, id: u64) -> Result<bool> {
        let mut inner = self
            .inner
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        Ok(inner.orders.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn draft(name: &str) -> OrderDraft {
        OrderDraft {
            phone_number: "+6281234567890".to_string(),
            name: name.to_string(),
            address: "123 Test Street".to_string(),
            total_lontong_large: 2,
            total_lontong_small: 3,
            total_price: Decimal::from(35_000),
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let store = InMemoryOrderStore::new();

        let first = store.insert(draft("a")).await.unwrap();
        let second = store.insert(draft("b")).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.created_at, first.updated_at);
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_delete() {
        let store = InMemoryOrderStore::new();

        let first = store.insert(draft("a")).await.unwrap();
        assert!(store.delete(first.id).await.unwrap());
        let second = store.insert(draft("b")).await.unwrap();

        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn test_get_order() {
        let store = InMemoryOrderStore::new();
        let order = store.insert(draft("a")).await.unwrap();

        let retrieved = store.get(order.id).await.unwrap();
        assert_eq!(retrieved, Some(order));
        assert!(store.get(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let store = InMemoryOrderStore::new();
        for name in ["a", "b", "c"] {
            store.insert(draft(name)).await.unwrap();
        }

        let ids: Vec<u64> = store.list().await.unwrap().iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn test_update_keeps_created_at() {
        let store = InMemoryOrderStore::new();
        let order = store.insert(draft("a")).await.unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let updated = store
            .update(order.id, draft("renamed"))
            .await
            .unwrap()
            .expect("exists");

        assert_eq!(updated.name, "renamed");
        assert_eq!(updated.created_at, order.created_at);
        assert!(updated.updated_at > order.updated_at);
    }

    #[tokio::test]
    async fn test_update_unknown_id() {
        let store = InMemoryOrderStore::new();
        assert!(store.update(7, draft("a")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_order() {
        let store = InMemoryOrderStore::new();
        let order = store.insert(draft("a")).await.unwrap();

        assert!(store.delete(order.id).await.unwrap());
        assert!(!store.delete(order.id).await.unwrap());
        assert!(store.get(order.id).await.unwrap().is_none());
        assert!(store.list().await.unwrap().is_empty());
    }
}
