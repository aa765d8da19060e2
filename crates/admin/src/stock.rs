//! Restocking and the low-stock view.
//!
//! [`StockAdjustment`] is the only writer of `Product::stock`. A restock sets
//! an absolute value (not a delta) by reading the current product record,
//! replacing its stock and writing the whole document back.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use storekeeper_core::{Product, ProductId};
use storekeeper_storefront::{PersistenceAdapter, Result, StorefrontError};

/// Products at or below this stock level appear in the low-stock view.
pub const LOW_STOCK_THRESHOLD: u64 = 5;

/// Products with stock at or below [`LOW_STOCK_THRESHOLD`], lowest first.
///
/// Ties keep their catalog order.
#[must_use]
pub fn low_stock_view(products: &[Product]) -> Vec<Product> {
    let mut low: Vec<Product> = products
        .iter()
        .filter(|product| product.stock <= LOW_STOCK_THRESHOLD)
        .cloned()
        .collect();
    low.sort_by_key(|product| product.stock);
    low
}

/// Working copy of the product list plus its derived low-stock view.
pub struct StockAdjustment {
    adapter: Arc<dyn PersistenceAdapter>,
    products: Vec<Product>,
    low_stock: Vec<Product>,
}

impl StockAdjustment {
    #[must_use]
    pub fn new(adapter: Arc<dyn PersistenceAdapter>) -> Self {
        Self {
            adapter,
            products: Vec::new(),
            low_stock: Vec::new(),
        }
    }

    /// Reload the product list.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Network` if the request fails; the working
    /// copy is kept.
    #[instrument(skip(self))]
    pub async fn load(&mut self) -> Result<&[Product]> {
        let products = self
            .adapter
            .list_products()
            .await
            .inspect_err(|e| warn!(error = %e, "Failed to load products"))?;
        self.products = products;
        self.recompute();
        Ok(&self.products)
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn low_stock(&self) -> &[Product] {
        &self.low_stock
    }

    /// Set the stock of `id` to `new_stock`.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Validation` if `new_stock` is missing or
    /// negative, `StorefrontError::NotFound` if the product is not in the
    /// working copy or no longer exists remotely, and
    /// `StorefrontError::Network` if the write fails. Nothing changes locally
    /// on error.
    #[instrument(skip(self))]
    pub async fn restock(&mut self, id: ProductId, new_stock: Option<i64>) -> Result<Product> {
        let stock = new_stock
            .ok_or_else(|| StorefrontError::Validation("Stock quantity is required".to_string()))
            .and_then(|stock| {
                u64::try_from(stock).map_err(|_| {
                    StorefrontError::Validation(format!("Stock cannot be negative (got {stock})"))
                })
            })?;

        if !self.products.iter().any(|product| product.id == id) {
            return Err(StorefrontError::NotFound(format!("product {id}")));
        }

        // The listing may be cached; replace the current record, not the listed one
        let mut updated = self
            .adapter
            .get_product(id)
            .await
            .inspect_err(|e| warn!(error = %e, "Failed to read product"))?;
        let previous = updated.stock;
        updated.stock = stock;

        let stored = self
            .adapter
            .replace_product(&updated)
            .await
            .inspect_err(|e| warn!(error = %e, "Failed to update stock"))?;

        info!(from = previous, to = stored.stock, "Stock updated");
        if let Some(slot) = self.products.iter_mut().find(|product| product.id == id) {
            *slot = stored.clone();
        }
        self.recompute();
        Ok(stored)
    }

    fn recompute(&mut self) {
        self.low_stock = low_stock_view(&self.products);
    }
}
