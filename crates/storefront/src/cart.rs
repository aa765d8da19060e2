//! Shopping cart state.
//!
//! [`reduce`] is the pure transition function; [`CartStore`] wraps it with
//! per-user persistence. Persisted state is written before it is committed
//! in memory, so a failed write leaves the cart exactly as it was.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, instrument, warn};

use storekeeper_core::{CartItem, Product, ProductId, UserId};

use crate::error::{Result, StorefrontError};
use crate::local_store::{LocalStore, StorageSlot};

/// Cart contents. At most one line per product, every quantity at least one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartState {
    items: Vec<CartItem>,
}

impl CartState {
    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// The line for `id`, if present.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Sum of quantities.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Sum of `price × quantity` over all lines.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A cart transition.
#[derive(Debug, Clone)]
pub enum CartAction {
    /// One more unit of the product. Out-of-stock products are ignored.
    Add(Product),
    /// Set the quantity; zero or less removes the line.
    /// Zero or less removes the line; values above `u32::MAX` saturate.
    UpdateQuantity { id: ProductId, quantity: i64 },
    Remove(ProductId),
    Clear,
    /// Replace the contents with previously persisted lines.
    Load(Vec<CartItem>),
}

/// Apply `action` to `state`.
#[must_use]
pub fn reduce(state: &CartState, action: CartAction) -> CartState {
    let mut items = state.items.clone();
    match action {
        CartAction::Add(product) => {
            if !product.in_stock() {
                return state.clone();
            }
            match items.iter_mut().find(|item| item.id() == product.id) {
                Some(item) => item.quantity = item.quantity.saturating_add(1),
                None => items.push(CartItem::new(product)),
            }
        }
        CartAction::UpdateQuantity { id, quantity } => {
            if quantity <= 0 {
                items.retain(|item| item.id() != id);
            } else if let Some(item) = items.iter_mut().find(|item| item.id() == id) {
                item.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
            }
        }
        CartAction::Remove(id) => items.retain(|item| item.id() != id),
        CartAction::Clear => items.clear(),
        CartAction::Load(loaded) => items = normalize(loaded),
    }
    CartState { items }
}

/// Drop empty lines and merge duplicates from an untrusted source.
fn normalize(loaded: Vec<CartItem>) -> Vec<CartItem> {
    let mut items: Vec<CartItem> = Vec::with_capacity(loaded.len());
    for line in loaded {
        if line.quantity == 0 {
            continue;
        }
        match items.iter_mut().find(|item| item.id() == line.id()) {
            Some(item) => item.quantity = item.quantity.saturating_add(line.quantity),
            None => items.push(line),
        }
    }
    items
}

/// The current user's cart, mirrored to durable storage.
///
/// Without an owner the cart is transient: mutations apply in memory only.
pub struct CartStore {
    state: CartState,
    owner: Option<UserId>,
    local: Arc<dyn LocalStore>,
}

impl CartStore {
    /// An empty, ownerless cart.
    #[must_use]
    pub fn new(local: Arc<dyn LocalStore>) -> Self {
        Self {
            state: CartState::default(),
            owner: None,
            local,
        }
    }

    /// Switch to `owner`, replacing the contents with their persisted cart.
    /// `None` discards the current contents.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Storage` if the persisted cart cannot be read.
    /// The store is left unchanged.
    #[instrument(skip(self))]
    pub fn load_for(&mut self, owner: Option<&UserId>) -> Result<()> {
        let loaded = self.read_persisted(owner)?;
        self.restore(owner, loaded);
        Ok(())
    }

    /// The persisted lines for `owner` (empty for `None`), without touching
    /// the store.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Storage` if the persisted cart cannot be read.
    pub fn read_persisted(&self, owner: Option<&UserId>) -> Result<Vec<CartItem>> {
        Ok(match owner {
            Some(uid) => StorageSlot::CART.load(self.local.as_ref(), uid)?,
            None => Vec::new(),
        })
    }

    /// Switch to `owner` with lines already read by [`Self::read_persisted`].
    pub fn restore(&mut self, owner: Option<&UserId>, loaded: Vec<CartItem>) {
        self.state = reduce(&CartState::default(), CartAction::Load(loaded));
        self.owner = owner.cloned();
        debug!(lines = self.state.items.len(), "Cart loaded");
    }

    /// Add one unit of `product`.
    ///
    /// Uses the stock value carried by `product`; live stock is the caller's
    /// responsibility.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::OutOfStock` if `product.stock` is zero, or
    /// `StorefrontError::Storage` if persisting fails.
    pub fn add_to_cart(&mut self, product: Product) -> Result<()> {
        if !product.in_stock() {
            return Err(StorefrontError::OutOfStock(product.id));
        }
        self.dispatch(CartAction::Add(product))
    }

    /// Set the quantity of `id`. Zero or less removes the line.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Validation` if `quantity` exceeds
    /// `u32::MAX`, or `StorefrontError::Storage` if persisting fails.
    pub fn update_quantity(&mut self, id: ProductId, quantity: i64) -> Result<()> {
        if quantity > i64::from(u32::MAX) {
            return Err(StorefrontError::Validation(format!(
                "Quantity {quantity} is too large"
            )));
        }
        self.dispatch(CartAction::UpdateQuantity { id, quantity })
    }

    /// # Errors
    ///
    /// Returns `StorefrontError::Storage` if persisting fails.
    pub fn remove_from_cart(&mut self, id: ProductId) -> Result<()> {
        self.dispatch(CartAction::Remove(id))
    }

    /// # Errors
    ///
    /// Returns `StorefrontError::Storage` if persisting fails.
    pub fn clear_cart(&mut self) -> Result<()> {
        self.dispatch(CartAction::Clear)
    }

    #[must_use]
    pub const fn state(&self) -> &CartState {
        &self.state
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        self.state.items()
    }

    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.state.total_items()
    }

    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.state.total_price()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    #[must_use]
    pub const fn owner(&self) -> Option<&UserId> {
        self.owner.as_ref()
    }

    fn dispatch(&mut self, action: CartAction) -> Result<()> {
        let next = reduce(&self.state, action);
        if let Some(owner) = &self.owner {
            StorageSlot::CART
                .save(self.local.as_ref(), owner, next.items())
                .inspect_err(|e| warn!(user = %owner, error = %e, "Failed to persist cart"))?;
        }
        self.state = next;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::local_store::{LocalStoreError, MemoryStore};
    use crate::test_support::product;

    struct BrokenStore;

    impl LocalStore for BrokenStore {
        fn load(&self, _key: &str) -> std::result::Result<Option<String>, LocalStoreError> {
            Ok(None)
        }

        fn save(&self, key: &str, _value: &str) -> std::result::Result<(), LocalStoreError> {
            Err(LocalStoreError::Io {
                path: key.into(),
                source: std::io::Error::other("disk full"),
            })
        }

        fn remove(&self, _key: &str) -> std::result::Result<(), LocalStoreError> {
            Ok(())
        }
    }

    fn owned_cart(store: Arc<dyn LocalStore>, uid: &str) -> CartStore {
        let mut cart = CartStore::new(store);
        cart.load_for(Some(&UserId::new(uid))).unwrap();
        cart
    }

    fn assert_invariants(state: &CartState) {
        let mut ids: Vec<_> = state.items().iter().map(CartItem::id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), state.items().len(), "duplicate product lines");
        assert!(state.items().iter().all(|item| item.quantity >= 1));
    }

    #[test]
    fn test_add_increments_existing_line() {
        let state = reduce(&CartState::default(), CartAction::Add(product(1, 10, 5)));
        let state = reduce(&state, CartAction::Add(product(1, 10, 5)));
        let state = reduce(&state, CartAction::Add(product(2, 3, 5)));

        assert_eq!(state.items().len(), 2);
        assert_eq!(state.get(ProductId::new(1)).unwrap().quantity, 2);
        assert_eq!(state.total_items(), 3);
        assert_eq!(state.total_price(), Decimal::from(23));
    }

    #[test]
    fn test_update_quantity_zero_or_negative_removes() {
        for quantity in [0, -1] {
            let state = reduce(&CartState::default(), CartAction::Add(product(1, 10, 5)));
            let state = reduce(
                &state,
                CartAction::UpdateQuantity {
                    id: ProductId::new(1),
                    quantity,
                },
            );
            assert!(state.is_empty(), "quantity {quantity} should remove");
        }
    }

    #[test]
    fn test_update_quantity_absent_is_noop() {
        let state = reduce(
            &CartState::default(),
            CartAction::UpdateQuantity {
                id: ProductId::new(1),
                quantity: 4,
            },
        );
        assert!(state.is_empty());
        let state = reduce(&state, CartAction::Remove(ProductId::new(1)));
        assert!(state.is_empty());
    }

    #[test]
    fn test_update_quantity_has_no_stock_ceiling() {
        let state = reduce(&CartState::default(), CartAction::Add(product(1, 10, 2)));
        let state = reduce(
            &state,
            CartAction::UpdateQuantity {
                id: ProductId::new(1),
                quantity: 50,
            },
        );
        assert_eq!(state.get(ProductId::new(1)).unwrap().quantity, 50);
    }

    #[test]
    fn test_invariants_hold_over_mixed_sequence() {
        let actions = [
            CartAction::Add(product(1, 10, 5)),
            CartAction::Add(product(2, 20, 5)),
            CartAction::Add(product(1, 10, 5)),
            CartAction::UpdateQuantity {
                id: ProductId::new(2),
                quantity: 7,
            },
            CartAction::Add(product(3, 1, 0)),
            CartAction::UpdateQuantity {
                id: ProductId::new(1),
                quantity: 0,
            },
            CartAction::Add(product(1, 10, 5)),
            CartAction::Remove(ProductId::new(9)),
            CartAction::Add(product(2, 20, 5)),
            CartAction::UpdateQuantity {
                id: ProductId::new(3),
                quantity: -4,
            },
        ];

        let mut state = CartState::default();
        for action in actions {
            state = reduce(&state, action);
            assert_invariants(&state);
            let expected: Decimal = state.items().iter().map(CartItem::line_total).sum();
            assert_eq!(state.total_price(), expected);
        }
        assert_eq!(state.get(ProductId::new(2)).unwrap().quantity, 8);
        assert_eq!(state.get(ProductId::new(1)).unwrap().quantity, 1);
        assert!(state.get(ProductId::new(3)).is_none());
    }

    #[test]
    fn test_load_normalizes_lines() {
        let mut zero = CartItem::new(product(3, 1, 1));
        zero.quantity = 0;
        let mut two = CartItem::new(product(1, 10, 5));
        two.quantity = 2;
        let loaded = vec![two, CartItem::new(product(1, 10, 5)), zero];

        let state = reduce(&CartState::default(), CartAction::Load(loaded));
        assert_eq!(state.items().len(), 1);
        assert_eq!(state.items()[0].quantity, 3);
    }

    #[test]
    fn test_add_out_of_stock_fails_without_change() {
        let mut cart = CartStore::new(Arc::new(MemoryStore::new()));
        let err = cart.add_to_cart(product(1, 10, 0)).unwrap_err();
        assert!(matches!(err, StorefrontError::OutOfStock(id) if id == ProductId::new(1)));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_anonymous_cart_is_not_persisted() {
        let store = Arc::new(MemoryStore::new());
        let mut cart = CartStore::new(store.clone());
        cart.add_to_cart(product(1, 10, 5)).unwrap();

        assert_eq!(cart.total_items(), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_cart_persists_per_user_and_reloads() {
        let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());
        let mut cart = owned_cart(store.clone(), "u1");
        cart.add_to_cart(product(1, 100, 5)).unwrap();
        cart.add_to_cart(product(1, 100, 5)).unwrap();
        cart.add_to_cart(product(2, 50, 5)).unwrap();

        assert!(store.load("cart_u1").unwrap().is_some());

        let reloaded = owned_cart(store.clone(), "u1");
        assert_eq!(reloaded.state(), cart.state());
        assert_eq!(reloaded.total_price(), Decimal::from(250));

        let other = owned_cart(store, "u2");
        assert!(other.is_empty());
    }

    #[test]
    fn test_sign_out_discards_contents() {
        let mut cart = owned_cart(Arc::new(MemoryStore::new()), "u1");
        cart.add_to_cart(product(1, 10, 5)).unwrap();
        cart.load_for(None).unwrap();

        assert!(cart.is_empty());
        assert_eq!(cart.owner(), None);
    }

    #[test]
    fn test_failed_persist_leaves_state_unchanged() {
        let mut cart = owned_cart(Arc::new(BrokenStore), "u1");
        let err = cart.add_to_cart(product(1, 10, 5)).unwrap_err();
        assert!(matches!(err, StorefrontError::Storage(_)));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_clear_cart_persists_empty_list() {
        let store = Arc::new(MemoryStore::new());
        let mut cart = owned_cart(store.clone(), "u1");
        cart.add_to_cart(product(1, 10, 5)).unwrap();
        cart.clear_cart().unwrap();

        assert_eq!(store.load("cart_u1").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_oversized_quantity_rejected() {
        let mut cart = owned_cart(Arc::new(MemoryStore::new()), "u1");
        cart.add_to_cart(product(1, 10, 5)).unwrap();

        let err = cart
            .update_quantity(ProductId::new(1), i64::from(u32::MAX) + 1)
            .unwrap_err();
        assert!(matches!(err, StorefrontError::Validation(_)));
        assert_eq!(cart.total_items(), 1);

        cart.update_quantity(ProductId::new(1), i64::from(u32::MAX))
            .unwrap();
        assert_eq!(cart.total_items(), u64::from(u32::MAX));
    }
}
