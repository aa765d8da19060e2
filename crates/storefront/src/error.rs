//! Unified error handling for storefront operations.
//!
//! Every operation reports failures through [`StorefrontError`]. Nothing is
//! retried automatically: a [`StorefrontError::Network`] failure leaves local
//! state untouched and the caller may simply invoke the operation again.

use thiserror::Error;

use storekeeper_core::{AddressError, ProductId};

use crate::local_store::LocalStoreError;
use crate::persistence::PersistenceError;
use crate::session::AuthError;

/// Error type for storefront operations.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Missing or invalid input. Raised before any state change or remote call.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Operation invoked in a state that forbids it. Raised before any
    /// remote call.
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    /// Product has no stock left.
    #[error("Product {0} is out of stock")]
    OutOfStock(ProductId),

    /// Remote call failed or returned an undecodable response.
    #[error("Network error: {0}")]
    Network(#[source] PersistenceError),

    /// Referenced entity is absent.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Durable local storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] LocalStoreError),

    /// Identity provider failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),
}

impl StorefrontError {
    /// Whether re-invoking the same operation may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

impl From<PersistenceError> for StorefrontError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::NotFound(what) => Self::NotFound(what),
            other => Self::Network(other),
        }
    }
}

impl From<AddressError> for StorefrontError {
    fn from(err: AddressError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Result type alias for `StorefrontError`.
pub type Result<T> = std::result::Result<T, StorefrontError>;
