//! Order use cases: validation, pricing, access control and persistence

use crate::core::auth::{AuthContext, Operation, authorize};
use crate::core::error::{LontongResult, OrderError, StorageError};
use crate::core::notification::Notification;
use crate::core::order::{NewOrder, Order, OrderPatch, OrderView};
use crate::core::pricing::UnitPrices;
use crate::core::query::{PaginatedResponse, QueryParams};
use crate::core::store::OrderStore;
use std::sync::Arc;

/// Service behind every order endpoint
///
/// Every operation takes the caller's [`AuthContext`] and applies the access
/// policy before touching the store, so it is safe to call without the HTTP
/// layer in front of it.
#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn OrderStore>,
    prices: UnitPrices,
}

impl OrderService {
    pub fn new(store: Arc<dyn OrderStore>, prices: UnitPrices) -> Self {
        Self { store, prices }
    }

    /// Unit prices used for every save and every rendered message
    pub fn prices(&self) -> &UnitPrices {
        &self.prices
    }

    /// Attach the contact link
    pub fn view(&self, order: Order) -> OrderView {
        OrderView::new(order, &self.prices)
    }

    pub async fn create(&self, caller: &AuthContext, input: NewOrder) -> LontongResult<Order> {
        check(Operation::Create, caller)?;

        let draft = input.into_draft(&self.prices)?;
        let order = self
            .store
            .insert(draft)
            .await
            .map_err(|e| StorageError::operation("create", e))?;

        tracing::info!(order_id = order.id, total_price = %order.total_price, "order created");
        Ok(order)
    }

    pub async fn list(
        &self,
        caller: &AuthContext,
        params: &QueryParams,
    ) -> LontongResult<PaginatedResponse<Order>> {
        check(Operation::Read, caller)?;

        let orders = self
            .store
            .list()
            .await
            .map_err(|e| StorageError::operation("list", e))?;

        Ok(params.apply(orders)?)
    }

    pub async fn get(&self, caller: &AuthContext, id: u64) -> LontongResult<Order> {
        check(Operation::Read, caller)?;
        self.find(id).await
    }

    pub async fn update(
        &self,
        caller: &AuthContext,
        id: u64,
        patch: OrderPatch,
    ) -> LontongResult<Order> {
        check(Operation::Update, caller)?;

        let current = self.find(id).await?;
        let draft = patch.apply_to(current.draft(), &self.prices)?;

        let order = self
            .store
            .update(id, draft)
            .await
            .map_err(|e| StorageError::operation("update", e))?
            .ok_or(OrderError::NotFound { id })?;

        tracing::info!(order_id = order.id, total_price = %order.total_price, "order updated");
        Ok(order)
    }

    pub async fn delete(&self, caller: &AuthContext, id: u64) -> LontongResult<()> {
        check(Operation::Delete, caller)?;

        let removed = self
            .store
            .delete(id)
            .await
            .map_err(|e| StorageError::operation("delete", e))?;

        if !removed {
            return Err(OrderError::NotFound { id }.into());
        }

        tracing::info!(order_id = id, "order deleted");
        Ok(())
    }

    /// Render the customer message and its link; the order is left untouched
    pub async fn notify(&self, caller: &AuthContext, id: u64) -> LontongResult<Notification> {
        check(Operation::Notify, caller)?;

        let order = self.find(id).await?;
        let notification = Notification::for_order(&order, &self.prices);

        tracing::info!(order_id = id, "whatsapp link generated");
        Ok(notification)
    }

    async fn find(&self, id: u64) -> LontongResult<Order> {
        self.store
            .get(id)
            .await
            .map_err(|e| StorageError::operation("fetch", e))?
            .ok_or_else(|| OrderError::NotFound { id }.into())
    }
}

fn check(operation: Operation, caller: &AuthContext) -> LontongResult<()> {
    authorize(operation, caller).map_err(|err| {
        tracing::debug!(%operation, user = caller.username().unwrap_or("anonymous"), "access denied");
        err.into()
    })
}
