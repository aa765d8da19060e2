//! The administrator's order board.

use std::sync::Arc;

use storekeeper_core::{Order, OrderId, OrderStatus};
use storekeeper_storefront::{OrderLifecycle, PersistenceAdapter, Result, StatusCounts};

/// Every order in the store, with status changes.
///
/// Thin wrapper over the same [`OrderLifecycle`] that backs customer order
/// history, scoped to all orders.
pub struct OrderBoard {
    lifecycle: OrderLifecycle,
}

impl OrderBoard {
    #[must_use]
    pub fn new(adapter: Arc<dyn PersistenceAdapter>) -> Self {
        Self {
            lifecycle: OrderLifecycle::for_admin(adapter),
        }
    }

    /// Reload all orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Network` if the request fails.
    pub async fn load(&mut self) -> Result<&[Order]> {
        self.lifecycle.load().await
    }

    #[must_use]
    pub fn orders(&self) -> &[Order] {
        self.lifecycle.orders()
    }

    /// Loaded orders currently in `status`.
    pub fn with_status(&self, status: OrderStatus) -> impl Iterator<Item = &Order> {
        self.orders()
            .iter()
            .filter(move |order| order.status == status)
    }

    #[must_use]
    pub fn status_counts(&self) -> StatusCounts {
        self.lifecycle.status_counts()
    }

    /// Move an order to any status, including backwards.
    ///
    /// # Errors
    ///
    /// See [`OrderLifecycle::set_status`].
    pub async fn set_status(&mut self, id: &OrderId, status: OrderStatus) -> Result<Order> {
        self.lifecycle.set_status(id, status).await
    }
}
