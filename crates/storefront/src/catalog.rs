//! Product browsing: search, category filter and sort.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing::instrument;

use storekeeper_core::{Category, CategoryId, Product, ProductId};

use crate::error::Result;
use crate::persistence::PersistenceAdapter;

/// Product list ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductSort {
    NameAsc,
    NameDesc,
    PriceAsc,
    PriceDesc,
    StockAsc,
    StockDesc,
}

impl ProductSort {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NameAsc => "name-asc",
            Self::NameDesc => "name-desc",
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
            Self::StockAsc => "stock-asc",
            Self::StockDesc => "stock-desc",
        }
    }

    fn compare(self, a: &Product, b: &Product) -> Ordering {
        match self {
            Self::NameAsc => compare_names(a, b),
            Self::NameDesc => compare_names(b, a),
            Self::PriceAsc => a.price.cmp(&b.price),
            Self::PriceDesc => b.price.cmp(&a.price),
            Self::StockAsc => a.stock.cmp(&b.stock),
            Self::StockDesc => b.stock.cmp(&a.stock),
        }
    }
}

fn compare_names(a: &Product, b: &Product) -> Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.name.cmp(&b.name))
}

impl fmt::Display for ProductSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductSort {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "name-asc" => Ok(Self::NameAsc),
            "name-desc" => Ok(Self::NameDesc),
            "price-asc" => Ok(Self::PriceAsc),
            "price-desc" => Ok(Self::PriceDesc),
            "stock-asc" => Ok(Self::StockAsc),
            "stock-desc" => Ok(Self::StockDesc),
            _ => Err(format!("invalid sort order: {s}")),
        }
    }
}

/// Filters applied to the product list. The default matches everything in
/// catalog order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    /// Case-insensitive substring of the name or description.
    pub search: Option<String>,
    pub category: Option<CategoryId>,
    pub sort: Option<ProductSort>,
}

impl ProductQuery {
    /// Whether `product` passes the search and category filters.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        let term = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(str::to_lowercase);
        let matches_search = term.is_none_or(|term| {
            product.name.to_lowercase().contains(&term)
                || product.description.to_lowercase().contains(&term)
        });
        let matches_category = self
            .category
            .is_none_or(|category| product.category_id == Some(category));
        matches_search && matches_category
    }

    /// Filter and sort `products`. Sorting is stable.
    #[must_use]
    pub fn apply(&self, products: &[Product]) -> Vec<Product> {
        let mut selected: Vec<Product> = products
            .iter()
            .filter(|product| self.matches(product))
            .cloned()
            .collect();
        if let Some(sort) = self.sort {
            selected.sort_by(|a, b| sort.compare(a, b));
        }
        selected
    }
}

/// Read access to products and categories.
#[derive(Clone)]
pub struct Catalog {
    adapter: Arc<dyn PersistenceAdapter>,
}

impl Catalog {
    #[must_use]
    pub fn new(adapter: Arc<dyn PersistenceAdapter>) -> Self {
        Self { adapter }
    }

    /// Products matching `query`.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Network` if the product list cannot be fetched.
    #[instrument(skip(self))]
    pub async fn products(&self, query: &ProductQuery) -> Result<Vec<Product>> {
        let products = self.adapter.list_products().await?;
        Ok(query.apply(&products))
    }

    /// Current record for one product, e.g. to check live stock.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::NotFound` for an unknown ID and
    /// `StorefrontError::Network` for transport failures.
    pub async fn product(&self, id: ProductId) -> Result<Product> {
        Ok(self.adapter.get_product(id).await?)
    }

    /// # Errors
    ///
    /// Returns `StorefrontError::Network` if the category list cannot be fetched.
    pub async fn categories(&self) -> Result<Vec<Category>> {
        Ok(self.adapter.list_categories().await?)
    }

    /// Products matching `query` together with every category, as needed to
    /// render a filterable listing. Fails if either list fails.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Network` if either list cannot be fetched.
    pub async fn listing(&self, query: &ProductQuery) -> Result<(Vec<Product>, Vec<Category>)> {
        let products = self.products(query).await?;
        let categories = self.categories().await?;
        Ok((products, categories))
    }
}
