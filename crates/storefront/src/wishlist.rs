//! Saved-for-later products.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use storekeeper_core::{Product, ProductId, UserId, WishlistItem};

use crate::error::Result;
use crate::local_store::{LocalStore, StorageSlot};

/// Wishlist contents, at most one entry per product.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WishlistState {
    items: Vec<WishlistItem>,
}

impl WishlistState {
    #[must_use]
    pub fn items(&self) -> &[WishlistItem] {
        &self.items
    }

    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.items.iter().any(|item| item.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone)]
pub enum WishlistAction {
    Add(Product),
    Remove(ProductId),
    Clear,
    Load(Vec<WishlistItem>),
}

/// Apply `action` to `state`.
#[must_use]
pub fn reduce(state: &WishlistState, action: WishlistAction) -> WishlistState {
    let mut items = state.items.clone();
    match action {
        WishlistAction::Add(product) => {
            if !state.contains(product.id) {
                items.push(product);
            }
        }
        WishlistAction::Remove(id) => items.retain(|item| item.id != id),
        WishlistAction::Clear => items.clear(),
        WishlistAction::Load(loaded) => {
            items.clear();
            for product in loaded {
                if !items.iter().any(|item| item.id == product.id) {
                    items.push(product);
                }
            }
        }
    }
    WishlistState { items }
}

/// The current user's wishlist, stored under `wishlist_<uid>`.
pub struct WishlistStore {
    state: WishlistState,
    owner: Option<UserId>,
    local: Arc<dyn LocalStore>,
}

impl WishlistStore {
    #[must_use]
    pub fn new(local: Arc<dyn LocalStore>) -> Self {
        Self {
            state: WishlistState::default(),
            owner: None,
            local,
        }
    }

    /// Replace the contents with `owner`'s stored wishlist, or clear them
    /// when signed out. Anonymous contents are never merged in.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Storage` if the stored list cannot be read.
    #[instrument(skip(self))]
    pub fn load_for(&mut self, owner: Option<&UserId>) -> Result<()> {
        let loaded = self.read_persisted(owner)?;
        self.restore(owner, loaded);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `StorefrontError::Storage` if the stored list cannot be read.
    pub fn read_persisted(&self, owner: Option<&UserId>) -> Result<Vec<WishlistItem>> {
        Ok(match owner {
            Some(uid) => StorageSlot::WISHLIST.load(self.local.as_ref(), uid)?,
            None => Vec::new(),
        })
    }

    /// Switch to `owner` with entries already read by [`Self::read_persisted`].
    pub fn restore(&mut self, owner: Option<&UserId>, loaded: Vec<WishlistItem>) {
        self.state = reduce(&WishlistState::default(), WishlistAction::Load(loaded));
        self.owner = owner.cloned();
        debug!(entries = self.state.len(), "Wishlist loaded");
    }

    /// Save `product`. Already-saved products are left as they are.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Storage` if persisting fails.
    pub fn add_to_wishlist(&mut self, product: Product) -> Result<()> {
        self.dispatch(WishlistAction::Add(product))
    }

    /// # Errors
    ///
    /// Returns `StorefrontError::Storage` if persisting fails.
    pub fn remove_from_wishlist(&mut self, id: ProductId) -> Result<()> {
        self.dispatch(WishlistAction::Remove(id))
    }

    /// # Errors
    ///
    /// Returns `StorefrontError::Storage` if persisting fails.
    pub fn clear(&mut self) -> Result<()> {
        self.dispatch(WishlistAction::Clear)
    }

    #[must_use]
    pub fn is_in_wishlist(&self, id: ProductId) -> bool {
        self.state.contains(id)
    }

    #[must_use]
    pub fn items(&self) -> &[WishlistItem] {
        self.state.items()
    }

    #[must_use]
    pub const fn state(&self) -> &WishlistState {
        &self.state
    }

    #[must_use]
    pub const fn owner(&self) -> Option<&UserId> {
        self.owner.as_ref()
    }

    fn dispatch(&mut self, action: WishlistAction) -> Result<()> {
        let next = reduce(&self.state, action);
        if next == self.state {
            return Ok(());
        }
        if let Some(owner) = &self.owner {
            StorageSlot::WISHLIST
                .save(self.local.as_ref(), owner, next.items())
                .inspect_err(|e| warn!(user = %owner, error = %e, "Failed to persist wishlist"))?;
        }
        self.state = next;
        Ok(())
    }
}
