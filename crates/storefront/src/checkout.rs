//! Checkout: delivery addresses and order placement.
//!
//! # Order placement
//!
//! 1. Require a selected address and a non-empty cart (no remote call otherwise)
//! 2. Snapshot the cart lines and the selected address into a new [`Order`]
//! 3. Persist the order
//! 4. Only then clear the cart
//!
//! Nothing de-duplicates submissions and no product stock is decremented.

use std::mem;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info, instrument, warn};

use storekeeper_core::{
    Address, AddressDraft, AddressId, Order, OrderId, OrderItem, OrderStatus, PaymentMethod,
};

use crate::cart::{CartState, CartStore};
use crate::error::{Result, StorefrontError};
use crate::persistence::PersistenceAdapter;
use crate::session::Identity;

/// Checkout state for one signed-in user.
pub struct CheckoutWorkflow {
    adapter: Arc<dyn PersistenceAdapter>,
    identity: Identity,
    addresses: Vec<Address>,
    selected: Option<AddressId>,
    draft: AddressDraft,
}

impl CheckoutWorkflow {
    /// A workflow with no addresses loaded yet.
    #[must_use]
    pub fn new(adapter: Arc<dyn PersistenceAdapter>, identity: Identity) -> Self {
        Self {
            adapter,
            identity,
            addresses: Vec::new(),
            selected: None,
            draft: AddressDraft::default(),
        }
    }

    #[must_use]
    pub const fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Local copy of the user's addresses.
    #[must_use]
    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    #[must_use]
    pub const fn selected_id(&self) -> Option<&AddressId> {
        self.selected.as_ref()
    }

    /// The selected address, if it is in the local list.
    #[must_use]
    pub fn selected_address(&self) -> Option<&Address> {
        let id = self.selected.as_ref()?;
        self.addresses.iter().find(|address| &address.id == id)
    }

    /// Pending new-address form data.
    #[must_use]
    pub const fn draft(&self) -> &AddressDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut AddressDraft {
        &mut self.draft
    }

    /// Reload the user's addresses. Selects the default address if nothing
    /// is selected yet.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Network` if the request fails; the local
    /// list and selection are left as they were.
    #[instrument(skip(self), fields(user = %self.identity.uid))]
    pub async fn fetch_addresses(&mut self) -> Result<&[Address]> {
        let addresses = self
            .adapter
            .list_addresses_for_user(&self.identity.uid)
            .await
            .inspect_err(|e| warn!(error = %e, "Failed to fetch addresses"))?;

        if self.selected.is_none() {
            self.selected = addresses
                .iter()
                .find(|address| address.is_default)
                .map(|address| address.id.clone());
        }
        self.addresses = addresses;
        Ok(&self.addresses)
    }

    /// Create and select a new address.
    ///
    /// The user's first address becomes the default; later ones never do.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Validation` if any field is empty (nothing is
    /// sent), or `StorefrontError::Network` if persisting fails (nothing
    /// changes locally).
    #[instrument(skip(self, draft), fields(user = %self.identity.uid))]
    pub async fn create_address(&mut self, draft: AddressDraft) -> Result<Address> {
        draft.validate()?;

        let address = Address::from_draft(
            draft,
            AddressId::generate(),
            self.identity.uid.clone(),
            self.addresses.is_empty(),
            Utc::now(),
        );

        let stored = self
            .adapter
            .create_address(&address)
            .await
            .inspect_err(|e| warn!(error = %e, "Failed to create address"))?;

        info!(address = %stored.id, is_default = stored.is_default, "Address created");
        self.selected = Some(stored.id.clone());
        self.addresses.push(stored.clone());
        Ok(stored)
    }

    /// Create an address from the pending draft, then reset the draft.
    ///
    /// # Errors
    ///
    /// Same as [`Self::create_address`]; on failure the draft is kept.
    pub async fn submit_draft(&mut self) -> Result<Address> {
        let draft = mem::take(&mut self.draft);
        self.create_address(draft.clone())
            .await
            .inspect_err(|_| self.draft = draft)
    }

    /// Select one of the loaded addresses.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::NotFound` if `id` is not in the local list.
    pub fn select_address(&mut self, id: &AddressId) -> Result<()> {
        if !self.addresses.iter().any(|address| &address.id == id) {
            return Err(StorefrontError::NotFound(format!("address {id}")));
        }
        self.selected = Some(id.clone());
        Ok(())
    }

    /// Build the order that placing `cart` at `now` would persist.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::PreconditionFailed` if no address is selected
    /// or the cart is empty.
    pub fn build_order(&self, cart: &CartState, now: DateTime<Utc>) -> Result<Order> {
        let address = self.selected_address().ok_or_else(|| {
            StorefrontError::PreconditionFailed("No delivery address selected".to_string())
        })?;
        if cart.is_empty() {
            return Err(StorefrontError::PreconditionFailed(
                "Cart is empty".to_string(),
            ));
        }

        Ok(Order {
            id: OrderId::generate(),
            user_id: self.identity.uid.clone(),
            user_email: self.identity.email.clone(),
            user_name: self.identity.display_name.clone(),
            items: cart.items().iter().map(OrderItem::from).collect(),
            total_amount: cart.total_price(),
            shipping_address: address.clone(),
            status: OrderStatus::OnProcess,
            order_date: now,
            estimated_delivery: Order::estimated_delivery_for(now),
            payment_method: PaymentMethod::CashOnDelivery,
            order_notes: Order::PLACED_NOTE.to_string(),
            extra: serde_json::Map::new(),
        })
    }

    /// Place an order for everything in `cart` and clear it.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::PreconditionFailed` without any remote call
    /// if no address is selected or the cart is empty, and
    /// `StorefrontError::Network` if persisting fails. In both cases the cart
    /// and selection are unchanged.
    #[instrument(skip(self, cart), fields(user = %self.identity.uid))]
    pub async fn place_order(&self, cart: &mut CartStore) -> Result<Order> {
        let order = self.build_order(cart.state(), Utc::now())?;

        let stored = self
            .adapter
            .create_order(&order)
            .await
            .inspect_err(|e| warn!(order = %order.id, error = %e, "Failed to place order"))?;

        info!(
            order = %stored.id,
            lines = stored.items.len(),
            total = %stored.total_amount,
            "Order placed"
        );

        // The order exists remotely now; failing here would invite a duplicate on retry
        if let Err(e) = cart.clear_cart() {
            error!(order = %stored.id, error = %e, "Order placed but cart could not be cleared");
        }
        Ok(stored)
    }
}
