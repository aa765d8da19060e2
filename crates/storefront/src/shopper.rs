//! The signed-in shopper: identity plus the stores keyed by it.
//!
//! Identity transitions are explicit. [`Shopper::set_identity`] reloads the
//! cart and wishlist for the new user (or clears them when signed out), and
//! checkout and order history are only handed out while someone is signed in.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::cart::CartStore;
use crate::catalog::Catalog;
use crate::checkout::CheckoutWorkflow;
use crate::error::{Result, StorefrontError};
use crate::local_store::LocalStore;
use crate::orders::OrderLifecycle;
use crate::persistence::PersistenceAdapter;
use crate::session::{AuthSession, Identity};
use crate::wishlist::WishlistStore;

pub struct Shopper {
    adapter: Arc<dyn PersistenceAdapter>,
    identity: Option<Identity>,
    cart: CartStore,
    wishlist: WishlistStore,
}

impl Shopper {
    /// A signed-out shopper with empty stores.
    #[must_use]
    pub fn new(adapter: Arc<dyn PersistenceAdapter>, local: Arc<dyn LocalStore>) -> Self {
        Self {
            adapter,
            identity: None,
            cart: CartStore::new(local.clone()),
            wishlist: WishlistStore::new(local),
        }
    }

    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Switch identity, reloading both stores for the new user.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Storage` if a stored cart or wishlist cannot
    /// be read. Identity and both stores are then left as they were.
    #[instrument(skip_all)]
    pub fn set_identity(&mut self, identity: Option<Identity>) -> Result<()> {
        let uid = identity.as_ref().map(|i| &i.uid);
        let cart = self.cart.read_persisted(uid)?;
        let wishlist = self.wishlist.read_persisted(uid)?;

        self.cart.restore(uid, cart);
        self.wishlist.restore(uid, wishlist);
        self.identity = identity;
        Ok(())
    }

    /// Adopt whatever identity `auth` currently reports.
    ///
    /// # Errors
    ///
    /// Same as [`Self::set_identity`].
    pub fn sync_with(&mut self, auth: &dyn AuthSession) -> Result<()> {
        self.set_identity(auth.current_identity())
    }

    /// Log in through `auth` and load the user's stores.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Auth` if login fails, or
    /// `StorefrontError::Storage` if the stores cannot be loaded.
    pub async fn sign_in(&mut self, auth: &dyn AuthSession) -> Result<&Identity> {
        let identity = auth.login().await?;
        info!(user = %identity.uid, "Signed in");
        self.set_identity(Some(identity))?;
        self.require_identity()
    }

    /// Log out through `auth` and clear the stores.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Auth` if logout fails.
    pub async fn sign_out(&mut self, auth: &dyn AuthSession) -> Result<()> {
        auth.logout().await?;
        self.set_identity(None)
    }

    /// The current identity, or `PreconditionFailed` when signed out.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::PreconditionFailed` if nobody is signed in.
    pub fn require_identity(&self) -> Result<&Identity> {
        self.identity
            .as_ref()
            .ok_or_else(|| StorefrontError::PreconditionFailed("Not signed in".to_string()))
    }

    #[must_use]
    pub const fn cart(&self) -> &CartStore {
        &self.cart
    }

    pub fn cart_mut(&mut self) -> &mut CartStore {
        &mut self.cart
    }

    #[must_use]
    pub const fn wishlist(&self) -> &WishlistStore {
        &self.wishlist
    }

    pub fn wishlist_mut(&mut self) -> &mut WishlistStore {
        &mut self.wishlist
    }

    #[must_use]
    pub fn catalog(&self) -> Catalog {
        Catalog::new(self.adapter.clone())
    }

    /// A checkout workflow with the user's addresses loaded.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::PreconditionFailed` if nobody is signed in,
    /// or `StorefrontError::Network` if the addresses cannot be fetched.
    pub async fn checkout(&self) -> Result<CheckoutWorkflow> {
        let identity = self.require_identity()?.clone();
        let mut workflow = CheckoutWorkflow::new(self.adapter.clone(), identity);
        workflow.fetch_addresses().await?;
        Ok(workflow)
    }

    /// The user's order history, loaded.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::PreconditionFailed` if nobody is signed in,
    /// or `StorefrontError::Network` if the orders cannot be fetched.
    pub async fn order_history(&self) -> Result<OrderLifecycle> {
        let uid = self.require_identity()?.uid.clone();
        let mut history = OrderLifecycle::for_customer(self.adapter.clone(), uid);
        history.load().await?;
        Ok(history)
    }
}
