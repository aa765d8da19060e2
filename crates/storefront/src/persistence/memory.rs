//! In-memory implementation of the persistence port.
//!
//! Mirrors the REST service's semantics (full-document replace, `userId`
//! filtering, not-found on unknown IDs) without any I/O. Call counters and an
//! offline switch make it usable as a test double for failure paths.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use storekeeper_core::{
    Address, AddressId, Category, CategoryId, Order, Product, ProductId, UserId,
};

use super::{PersistenceAdapter, PersistenceError};

#[derive(Default)]
struct Collections {
    products: BTreeMap<ProductId, Product>,
    categories: BTreeMap<CategoryId, Category>,
    orders: Vec<Order>,
    addresses: Vec<Address>,
}

/// Process-local persistence service.
#[derive(Default)]
pub struct InMemoryPersistence {
    collections: Mutex<Collections>,
    offline: AtomicBool,
    calls: AtomicUsize,
    writes: AtomicUsize,
}

impl InMemoryPersistence {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed products.
    #[must_use]
    pub fn with_products(self, products: impl IntoIterator<Item = Product>) -> Self {
        {
            let mut collections = self.lock();
            for product in products {
                collections.products.insert(product.id, product);
            }
        }
        self
    }

    /// Seed categories.
    #[must_use]
    pub fn with_categories(self, categories: impl IntoIterator<Item = Category>) -> Self {
        {
            let mut collections = self.lock();
            for category in categories {
                collections.categories.insert(category.id, category);
            }
        }
        self
    }

    /// Seed an order directly, bypassing call counting.
    pub fn seed_order(&self, order: Order) {
        self.lock().orders.push(order);
    }

    /// Make every subsequent call fail with `PersistenceError::Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of calls received (reads and writes, including failed ones).
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of write calls received (including failed ones).
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Current stored orders, in insertion order.
    #[must_use]
    pub fn stored_orders(&self) -> Vec<Order> {
        self.lock().orders.clone()
    }

    /// Current stored addresses, in insertion order.
    #[must_use]
    pub fn stored_addresses(&self) -> Vec<Address> {
        self.lock().addresses.clone()
    }

    /// Current stored product, if any.
    #[must_use]
    pub fn stored_product(&self, id: ProductId) -> Option<Product> {
        self.lock().products.get(&id).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, Collections> {
        self.collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn enter(&self, write: bool) -> Result<MutexGuard<'_, Collections>, PersistenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if write {
            self.writes.fetch_add(1, Ordering::SeqCst);
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(PersistenceError::Unavailable(
                "persistence service is offline".to_string(),
            ));
        }
        Ok(self.lock())
    }
}

fn duplicate(collection: &str, id: impl std::fmt::Display) -> PersistenceError {
    PersistenceError::Status {
        status: 500,
        body: format!("duplicate id {id} in {collection}"),
    }
}

fn not_found(collection: &str, id: impl std::fmt::Display) -> PersistenceError {
    PersistenceError::NotFound(format!("/{collection}/{id}"))
}

#[async_trait]
impl PersistenceAdapter for InMemoryPersistence {
    async fn list_products(&self) -> Result<Vec<Product>, PersistenceError> {
        Ok(self.enter(false)?.products.values().cloned().collect())
    }

    async fn get_product(&self, id: ProductId) -> Result<Product, PersistenceError> {
        self.enter(false)?
            .products
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found("products", id))
    }

    async fn create_product(&self, product: &Product) -> Result<Product, PersistenceError> {
        let mut collections = self.enter(true)?;
        if collections.products.contains_key(&product.id) {
            return Err(duplicate("products", product.id));
        }
        collections.products.insert(product.id, product.clone());
        Ok(product.clone())
    }

    async fn replace_product(&self, product: &Product) -> Result<Product, PersistenceError> {
        let mut collections = self.enter(true)?;
        let slot = collections
            .products
            .get_mut(&product.id)
            .ok_or_else(|| not_found("products", product.id))?;
        *slot = product.clone();
        Ok(product.clone())
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), PersistenceError> {
        self.enter(true)?
            .products
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found("products", id))
    }

    async fn list_categories(&self) -> Result<Vec<Category>, PersistenceError> {
        Ok(self.enter(false)?.categories.values().cloned().collect())
    }

    async fn get_category(&self, id: CategoryId) -> Result<Category, PersistenceError> {
        self.enter(false)?
            .categories
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found("categories", id))
    }

    async fn list_orders(&self) -> Result<Vec<Order>, PersistenceError> {
        Ok(self.enter(false)?.orders.clone())
    }

    async fn list_orders_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, PersistenceError> {
        Ok(self
            .enter(false)?
            .orders
            .iter()
            .filter(|order| &order.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create_order(&self, order: &Order) -> Result<Order, PersistenceError> {
        let mut collections = self.enter(true)?;
        if collections.orders.iter().any(|o| o.id == order.id) {
            return Err(duplicate("orders", &order.id));
        }
        collections.orders.push(order.clone());
        Ok(order.clone())
    }

    async fn replace_order(&self, order: &Order) -> Result<Order, PersistenceError> {
        let mut collections = self.enter(true)?;
        let slot = collections
            .orders
            .iter_mut()
            .find(|o| o.id == order.id)
            .ok_or_else(|| not_found("orders", &order.id))?;
        *slot = order.clone();
        Ok(order.clone())
    }

    async fn list_addresses_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Address>, PersistenceError> {
        Ok(self
            .enter(false)?
            .addresses
            .iter()
            .filter(|address| &address.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create_address(&self, address: &Address) -> Result<Address, PersistenceError> {
        let mut collections = self.enter(true)?;
        if collections.addresses.iter().any(|a| a.id == address.id) {
            return Err(duplicate("addresses", &address.id));
        }
        collections.addresses.push(address.clone());
        Ok(address.clone())
    }

    async fn replace_address(&self, address: &Address) -> Result<Address, PersistenceError> {
        let mut collections = self.enter(true)?;
        let slot = collections
            .addresses
            .iter_mut()
            .find(|a| a.id == address.id)
            .ok_or_else(|| not_found("addresses", &address.id))?;
        *slot = address.clone();
        Ok(address.clone())
    }

    async fn delete_address(&self, id: &AddressId) -> Result<(), PersistenceError> {
        let mut collections = self.enter(true)?;
        let before = collections.addresses.len();
        collections.addresses.retain(|a| &a.id != id);
        if collections.addresses.len() == before {
            return Err(not_found("addresses", id));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_support::{address, product};

    #[tokio::test]
    async fn test_replace_is_full_document() {
        let store = InMemoryPersistence::new().with_products([product(1, 10, 4)]);
        let mut updated = store.get_product(ProductId::new(1)).await.unwrap();
        updated.stock = 0;
        updated.name = "Renamed".to_string();
        store.replace_product(&updated).await.unwrap();

        assert_eq!(store.stored_product(ProductId::new(1)), Some(updated));
    }

    #[tokio::test]
    async fn test_replace_unknown_is_not_found() {
        let store = InMemoryPersistence::new();
        let err = store.replace_product(&product(9, 1, 1)).await.unwrap_err();
        assert!(matches!(err, PersistenceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_addresses_filtered_by_user() {
        let store = InMemoryPersistence::new();
        store.create_address(&address("A1", "u1", true)).await.unwrap();
        store.create_address(&address("A2", "u2", true)).await.unwrap();

        let mine = store
            .list_addresses_for_user(&UserId::new("u1"))
            .await
            .unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, AddressId::new("A1"));
    }

    #[tokio::test]
    async fn test_offline_counts_calls_and_fails() {
        let store = InMemoryPersistence::new();
        store.set_offline(true);

        let err = store.list_products().await.unwrap_err();
        assert!(matches!(err, PersistenceError::Unavailable(_)));
        let err = store.create_product(&product(1, 1, 1)).await.unwrap_err();
        assert!(matches!(err, PersistenceError::Unavailable(_)));

        assert_eq!(store.call_count(), 2);
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_create_rejected() {
        let store = InMemoryPersistence::new();
        store.create_address(&address("A1", "u1", true)).await.unwrap();
        let err = store
            .create_address(&address("A1", "u1", false))
            .await
            .unwrap_err();
        assert!(matches!(err, PersistenceError::Status { status: 500, .. }));
    }
}
