//! Persistence service port and adapters.
//!
//! # Architecture
//!
//! - The service is a schema-less REST collection store: no transactions,
//!   no partial updates, no server-side validation
//! - Every update is a full-document replace, so callers always send the
//!   complete record they previously read
//! - Records are decoded into the typed schemas from `storekeeper-core` and
//!   validated at this boundary; anything that fails to decode never reaches
//!   the stores
//!
//! # Adapters
//!
//! - [`HttpPersistence`] - JSON over HTTP with a `moka` catalog cache
//! - [`InMemoryPersistence`] - in-process collections for tests and offline use

mod cache;
mod http;
mod memory;

pub use http::HttpPersistence;
pub use memory::InMemoryPersistence;

use async_trait::async_trait;
use thiserror::Error;

use storekeeper_core::{
    Address, AddressId, Category, CategoryId, Order, Product, ProductId, RecordError, UserId,
};

/// Errors that can occur when talking to the persistence service.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Service answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// Response status code.
        status: u16,
        /// Truncated response body.
        body: String,
    },

    /// Rate limited by the service.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Decode(#[from] serde_json::Error),

    /// A record decoded but violates its schema.
    #[error("Invalid record: {0}")]
    Invalid(#[from] RecordError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Service unreachable.
    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

/// Collection-oriented access to the persistence service.
///
/// All writes are whole-document overwrites.
#[async_trait]
pub trait PersistenceAdapter: Send + Sync {
    // Products
    async fn list_products(&self) -> Result<Vec<Product>, PersistenceError>;
    async fn get_product(&self, id: ProductId) -> Result<Product, PersistenceError>;
    async fn create_product(&self, product: &Product) -> Result<Product, PersistenceError>;
    async fn replace_product(&self, product: &Product) -> Result<Product, PersistenceError>;
    async fn delete_product(&self, id: ProductId) -> Result<(), PersistenceError>;

    // Categories (read-only)
    async fn list_categories(&self) -> Result<Vec<Category>, PersistenceError>;
    async fn get_category(&self, id: CategoryId) -> Result<Category, PersistenceError>;

    // Orders
    async fn list_orders(&self) -> Result<Vec<Order>, PersistenceError>;
    async fn list_orders_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, PersistenceError>;
    async fn create_order(&self, order: &Order) -> Result<Order, PersistenceError>;
    async fn replace_order(&self, order: &Order) -> Result<Order, PersistenceError>;

    // Addresses
    async fn list_addresses_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Address>, PersistenceError>;
    async fn create_address(&self, address: &Address) -> Result<Address, PersistenceError>;
    async fn replace_address(&self, address: &Address) -> Result<Address, PersistenceError>;
    async fn delete_address(&self, id: &AddressId) -> Result<(), PersistenceError>;
}

/// Records that carry invariants beyond what serde checks.
pub(crate) trait Validated {
    fn check(&self) -> Result<(), RecordError>;
}

impl Validated for Product {
    fn check(&self) -> Result<(), RecordError> {
        self.validate()
    }
}

impl Validated for Order {
    fn check(&self) -> Result<(), RecordError> {
        self.validate()
    }
}

impl Validated for Category {
    fn check(&self) -> Result<(), RecordError> {
        Ok(())
    }
}

impl Validated for Address {
    fn check(&self) -> Result<(), RecordError> {
        Ok(())
    }
}

impl<T: Validated> Validated for Vec<T> {
    fn check(&self) -> Result<(), RecordError> {
        self.iter().try_for_each(Validated::check)
    }
}
