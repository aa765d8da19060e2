//! End-to-end flows across the Storekeeper crates.
//!
//! Every test runs a shopper and an administrator against one shared
//! [`InMemoryPersistence`] backend, with carts and wishlists kept in a
//! [`MemoryStore`], so no network or filesystem is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p storekeeper-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use serde_json::Map;

use storekeeper_core::{
    Address, AddressDraft, AddressId, CartItem, Order, OrderId, OrderItem, OrderStatus,
    PaymentMethod, Product, ProductId, UserId,
};
use storekeeper_storefront::{
    Identity, InMemoryPersistence, MemoryStore, PersistenceAdapter, Shopper, StaticAuth,
};

/// A shared backend and local store, as two processes on one machine would see them.
pub struct World {
    pub backend: Arc<InMemoryPersistence>,
    pub local: Arc<MemoryStore>,
}

impl World {
    #[must_use]
    pub fn new(products: impl IntoIterator<Item = Product>) -> Self {
        Self {
            backend: Arc::new(InMemoryPersistence::new().with_products(products)),
            local: Arc::new(MemoryStore::new()),
        }
    }

    #[must_use]
    pub fn adapter(&self) -> Arc<dyn PersistenceAdapter> {
        self.backend.clone()
    }

    /// A signed-out shopper on this world's stores.
    #[must_use]
    pub fn shopper(&self) -> Shopper {
        Shopper::new(self.adapter(), self.local.clone())
    }

    /// A shopper signed in as `uid`.
    ///
    /// # Panics
    ///
    /// Panics if signing in fails.
    pub async fn signed_in(&self, uid: &str) -> Shopper {
        let mut shopper = self.shopper();
        let auth = StaticAuth::new(Some(identity(uid)));
        if let Err(e) = shopper.sign_in(&auth).await {
            panic!("sign in as {uid} failed: {e}");
        }
        shopper
    }
}

#[must_use]
pub fn product(id: i64, price: i64, stock: u64) -> Product {
    Product {
        id: ProductId::new(id),
        name: format!("Product {id}"),
        description: String::new(),
        price: Decimal::from(price),
        stock,
        category_id: None,
        image: format!("product-{id}.png"),
        extra: Map::new(),
    }
}

#[must_use]
pub fn identity(uid: &str) -> Identity {
    Identity {
        email: Some(format!("{uid}@example.com")),
        display_name: Some(format!("User {uid}")),
        ..Identity::new(uid)
    }
}

#[must_use]
pub fn draft(name: &str) -> AddressDraft {
    AddressDraft {
        name: name.to_string(),
        street: "1 Analytical Way".to_string(),
        city: "London".to_string(),
        state: "LDN".to_string(),
        zip_code: "N1 9GU".to_string(),
        country: "UK".to_string(),
    }
}

/// An order for one unit of `item`, placed `days_ago`.
#[must_use]
pub fn order(id: &str, user: &str, item: &Product, status: OrderStatus, days_ago: i64) -> Order {
    let line = CartItem::new(item.clone());
    let order_date = Utc::now() - Duration::days(days_ago);
    let shipping_address = Address::from_draft(
        draft("Ada"),
        AddressId::new("A1"),
        UserId::new(user),
        true,
        order_date,
    );
    Order {
        id: OrderId::new(id),
        user_id: UserId::new(user),
        user_email: None,
        user_name: None,
        items: vec![OrderItem::from(&line)],
        total_amount: line.line_total(),
        shipping_address,
        status,
        order_date,
        estimated_delivery: Order::estimated_delivery_for(order_date),
        payment_method: PaymentMethod::CashOnDelivery,
        order_notes: Order::PLACED_NOTE.to_string(),
        extra: Map::new(),
    }
}
