//! Order history and status changes.
//!
//! The same [`OrderLifecycle`] backs a customer's own order history and the
//! administrator's full order board; only the [`OrderScope`] differs.
//!
//! Status changes are whole-document replaces with no concurrency check: if
//! two writers update the same order, the later write wins.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use storekeeper_core::{Order, OrderId, OrderStatus, UserId};

use crate::error::{Result, StorefrontError};
use crate::persistence::PersistenceAdapter;

/// Which orders a lifecycle view loads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderScope {
    /// One customer's orders.
    Customer(UserId),
    /// Every order in the store.
    All,
}

/// Number of orders per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub on_process: usize,
    pub shipped: usize,
    pub delivered: usize,
}

impl StatusCounts {
    #[must_use]
    pub const fn get(&self, status: OrderStatus) -> usize {
        match status {
            OrderStatus::OnProcess => self.on_process,
            OrderStatus::Shipped => self.shipped,
            OrderStatus::Delivered => self.delivered,
        }
    }

    #[must_use]
    pub const fn total(&self) -> usize {
        self.on_process + self.shipped + self.delivered
    }

    fn record(&mut self, status: OrderStatus) {
        match status {
            OrderStatus::OnProcess => self.on_process += 1,
            OrderStatus::Shipped => self.shipped += 1,
            OrderStatus::Delivered => self.delivered += 1,
        }
    }
}

/// Local working copy of a set of orders.
pub struct OrderLifecycle {
    adapter: Arc<dyn PersistenceAdapter>,
    scope: OrderScope,
    orders: Vec<Order>,
}

impl OrderLifecycle {
    #[must_use]
    pub fn new(adapter: Arc<dyn PersistenceAdapter>, scope: OrderScope) -> Self {
        Self {
            adapter,
            scope,
            orders: Vec::new(),
        }
    }

    /// A view of `user`'s own orders.
    #[must_use]
    pub fn for_customer(adapter: Arc<dyn PersistenceAdapter>, user: UserId) -> Self {
        Self::new(adapter, OrderScope::Customer(user))
    }

    /// A view of every order.
    #[must_use]
    pub fn for_admin(adapter: Arc<dyn PersistenceAdapter>) -> Self {
        Self::new(adapter, OrderScope::All)
    }

    #[must_use]
    pub const fn scope(&self) -> &OrderScope {
        &self.scope
    }

    /// Loaded orders, newest first.
    #[must_use]
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    #[must_use]
    pub fn get(&self, id: &OrderId) -> Option<&Order> {
        self.orders.iter().find(|order| &order.id == id)
    }

    /// Reload orders for this view's scope.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Network` if the request fails; the previous
    /// working copy is kept.
    #[instrument(skip(self), fields(scope = ?self.scope))]
    pub async fn load(&mut self) -> Result<&[Order]> {
        let mut orders = match &self.scope {
            OrderScope::Customer(user) => self.adapter.list_orders_for_user(user).await,
            OrderScope::All => self.adapter.list_orders().await,
        }
        .inspect_err(|e| warn!(error = %e, "Failed to load orders"))?;

        orders.sort_by(|a, b| b.order_date.cmp(&a.order_date));
        self.orders = orders;
        Ok(&self.orders)
    }

    /// Set the status of a loaded order.
    ///
    /// Any status may follow any other. The full order is written back with
    /// only `status` changed, and the working copy is replaced with what the
    /// service returned.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::NotFound` if `id` is not in the working copy
    /// or no longer exists remotely, and `StorefrontError::Network` if the
    /// write fails. The working copy is unchanged on error.
    #[instrument(skip(self))]
    pub async fn set_status(&mut self, id: &OrderId, status: OrderStatus) -> Result<Order> {
        let mut updated = self
            .get(id)
            .cloned()
            .ok_or_else(|| StorefrontError::NotFound(format!("order {id}")))?;
        let previous = updated.status;
        updated.status = status;

        let stored = self
            .adapter
            .replace_order(&updated)
            .await
            .inspect_err(|e| warn!(error = %e, "Failed to update order status"))?;

        info!(from = %previous, to = %stored.status, "Order status updated");
        if let Some(slot) = self.orders.iter_mut().find(|order| &order.id == id) {
            *slot = stored.clone();
        }
        Ok(stored)
    }

    /// Count of loaded orders per status.
    #[must_use]
    pub fn status_counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for order in &self.orders {
            counts.record(order.status);
        }
        counts
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::persistence::InMemoryPersistence;
    use crate::test_support::order;

    fn seeded() -> Arc<InMemoryPersistence> {
        let adapter = Arc::new(InMemoryPersistence::new());
        adapter.seed_order(order("ORD-1", "u1", OrderStatus::Delivered, 10));
        adapter.seed_order(order("ORD-2", "u2", OrderStatus::OnProcess, 1));
        adapter.seed_order(order("ORD-3", "u1", OrderStatus::Shipped, 3));
        adapter
    }

    #[tokio::test]
    async fn test_customer_view_is_filtered_and_newest_first() {
        let adapter = seeded();
        let mut history = OrderLifecycle::for_customer(adapter, UserId::new("u1"));
        let ids: Vec<_> = history
            .load()
            .await
            .unwrap()
            .iter()
            .map(|o| o.id.to_string())
            .collect();
        assert_eq!(ids, ["ORD-3", "ORD-1"]);
    }

    #[tokio::test]
    async fn test_admin_view_sees_everything() {
        let mut board = OrderLifecycle::for_admin(seeded());
        board.load().await.unwrap();

        assert_eq!(board.orders().len(), 3);
        assert_eq!(board.orders()[0].id, OrderId::new("ORD-2"));
        let counts = board.status_counts();
        assert_eq!(counts.get(OrderStatus::OnProcess), 1);
        assert_eq!(counts.get(OrderStatus::Shipped), 1);
        assert_eq!(counts.get(OrderStatus::Delivered), 1);
        assert_eq!(counts.total(), 3);
    }

    #[tokio::test]
    async fn test_status_can_move_backwards() {
        let adapter = seeded();
        let mut board = OrderLifecycle::for_admin(adapter.clone());
        board.load().await.unwrap();

        let updated = board
            .set_status(&OrderId::new("ORD-1"), OrderStatus::OnProcess)
            .await
            .unwrap();
        assert_eq!(updated.status, OrderStatus::OnProcess);

        let stored = adapter
            .stored_orders()
            .into_iter()
            .find(|o| o.id == OrderId::new("ORD-1"))
            .unwrap();
        let mut expected = order("ORD-1", "u1", OrderStatus::Delivered, 10);
        expected.status = OrderStatus::OnProcess;
        assert_eq!(stored, expected);
        assert_eq!(board.get(&OrderId::new("ORD-1")).unwrap().status, OrderStatus::OnProcess);
    }

    #[tokio::test]
    async fn test_set_status_unknown_order_makes_no_call() {
        let adapter = seeded();
        let mut board = OrderLifecycle::for_admin(adapter.clone());
        board.load().await.unwrap();
        let calls = adapter.call_count();

        let err = board
            .set_status(&OrderId::new("ORD-404"), OrderStatus::Shipped)
            .await
            .unwrap_err();
        assert!(matches!(err, StorefrontError::NotFound(_)));
        assert_eq!(adapter.call_count(), calls);
    }

    #[tokio::test]
    async fn test_set_status_failure_keeps_working_copy() {
        let adapter = seeded();
        let mut board = OrderLifecycle::for_admin(adapter.clone());
        board.load().await.unwrap();

        adapter.set_offline(true);
        let err = board
            .set_status(&OrderId::new("ORD-2"), OrderStatus::Shipped)
            .await
            .unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(board.get(&OrderId::new("ORD-2")).unwrap().status, OrderStatus::OnProcess);
    }

    #[tokio::test]
    async fn test_later_write_wins() {
        let adapter = seeded();
        let mut first = OrderLifecycle::for_admin(adapter.clone());
        let mut second = OrderLifecycle::for_admin(adapter.clone());
        first.load().await.unwrap();
        second.load().await.unwrap();

        let id = OrderId::new("ORD-2");
        first.set_status(&id, OrderStatus::Shipped).await.unwrap();
        second.set_status(&id, OrderStatus::Delivered).await.unwrap();

        let stored = adapter.stored_orders();
        let stored = stored.iter().find(|o| o.id == id).unwrap();
        assert_eq!(stored.status, OrderStatus::Delivered);
    }
}
