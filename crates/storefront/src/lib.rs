//! Storekeeper storefront state.
//!
//! Client-side state for a shop backed by a schema-less REST collection store:
//!
//! - [`cart`] and [`wishlist`] - per-user stores mirrored to a [`local_store`]
//! - [`checkout`] - delivery addresses and order placement
//! - [`orders`] - order history and status changes, shared with the admin board
//! - [`catalog`] - product search, filtering and sorting
//! - [`persistence`] - the REST service port, an HTTP adapter and an
//!   in-memory adapter
//! - [`session`] and [`shopper`] - identity and the stores gated by it

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod local_store;
pub mod orders;
pub mod persistence;
pub mod session;
pub mod shopper;
pub mod wishlist;

#[cfg(test)]
mod test_support;

pub use cart::CartStore;
pub use catalog::{Catalog, ProductQuery, ProductSort};
pub use checkout::CheckoutWorkflow;
pub use config::{ApiConfig, ConfigError, StorefrontConfig};
pub use error::{Result, StorefrontError};
pub use local_store::{FileStore, LocalStore, MemoryStore};
pub use orders::{OrderLifecycle, OrderScope, StatusCounts};
pub use persistence::{HttpPersistence, InMemoryPersistence, PersistenceAdapter, PersistenceError};
pub use session::{AuthSession, Identity, StaticAuth};
pub use shopper::Shopper;
pub use wishlist::WishlistStore;
