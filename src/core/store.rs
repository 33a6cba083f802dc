//! Persistence seam for orders

use crate::core::order::{Order, OrderDraft};
use anyhow::Result;
use async_trait::async_trait;

/// Storage for orders
///
/// Implementations assign ids and timestamps. Each call is atomic with respect
/// to the record it touches; concurrent updates of one record are last write
/// wins.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist a new order under the next id, stamping both timestamps
    async fn insert(&self, draft: OrderDraft) -> Result<Order>;

    /// Get an order by id
    async fn get(&self, id: u64) -> Result<Option<Order>>;

    /// All orders, newest first
    async fn list(&self) -> Result<Vec<Order>>;

    /// Overwrite the writable fields of an existing order and refresh
    /// `updated_at`; `None` when the id is unknown
    async fn update(&self, id: u64, draft: OrderDraft) -> Result<Option<Order>>;

    /// Permanently remove an order; `false` when the id is unknown
    async fn delete(&self, id: u64) -> Result<bool>;
}
