//! HTTP implementation of the persistence port.
//!
//! Uses `reqwest` for JSON requests against the collection endpoints
//! (`/products`, `/categories`, `/orders`, `/addresses`). Product and category
//! lists are cached with `moka` and product writes invalidate the cache.

use std::sync::Arc;

use async_trait::async_trait;
use moka::future::Cache;
use reqwest::{RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use storekeeper_core::{
    Address, AddressId, Category, CategoryId, Order, Product, ProductId, UserId,
};

use super::cache::{CacheKey, CacheValue};
use super::{PersistenceAdapter, PersistenceError, Validated};
use crate::config::ApiConfig;

const PRODUCTS: &str = "products";
const CATEGORIES: &str = "categories";
const ORDERS: &str = "orders";
const ADDRESSES: &str = "addresses";

/// Longest response body excerpt kept in errors and logs.
const BODY_EXCERPT: usize = 200;

// =============================================================================
// HttpPersistence
// =============================================================================

/// Client for the REST persistence service.
///
/// Cheaply cloneable; clones share the connection pool and the catalog cache.
#[derive(Clone)]
pub struct HttpPersistence {
    inner: Arc<HttpPersistenceInner>,
}

struct HttpPersistenceInner {
    client: reqwest::Client,
    base_url: Url,
    token: Option<SecretString>,
    cache: Cache<CacheKey, CacheValue>,
}

impl HttpPersistence {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::Http` if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, PersistenceError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        let cache = Cache::builder()
            .max_capacity(16)
            .time_to_live(config.catalog_cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(HttpPersistenceInner {
                client,
                base_url: config.base_url.clone(),
                token: config.token.clone(),
                cache,
            }),
        })
    }

    /// Build `<base>/<segments…>`.
    fn url(&self, segments: &[&str]) -> Result<Url, PersistenceError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                PersistenceError::Unavailable(format!(
                    "{} cannot be used as a base URL",
                    self.inner.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Build `<base>/<collection>?userId=<uid>`.
    fn user_filtered_url(&self, collection: &str, user_id: &UserId) -> Result<Url, PersistenceError> {
        let mut url = self.url(&[collection])?;
        url.query_pairs_mut().append_pair("userId", user_id.as_str());
        Ok(url)
    }

    /// Send a request and return the body of a successful response.
    async fn send(&self, request: RequestBuilder) -> Result<String, PersistenceError> {
        let request = match &self.inner.token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(PersistenceError::NotFound(response.url().path().to_string()));
        }

        // Check for rate limiting
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(PersistenceError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %excerpt(&body),
                "Persistence service returned non-success status"
            );
            return Err(PersistenceError::Status {
                status: status.as_u16(),
                body: excerpt(&body),
            });
        }

        Ok(body)
    }

    /// Send a request and decode the response into a validated record.
    async fn fetch<T>(&self, request: RequestBuilder) -> Result<T, PersistenceError>
    where
        T: DeserializeOwned + Validated,
    {
        let body = self.send(request).await?;
        decode(&body)
    }

    /// Send a JSON body with `method` and decode the echoed record.
    async fn write<B, T>(
        &self,
        method: reqwest::Method,
        url: Url,
        body: &B,
    ) -> Result<T, PersistenceError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned + Validated,
    {
        let request = self.inner.client.request(method, url).json(body);
        self.fetch(request).await
    }

    async fn invalidate_products(&self) {
        self.inner.cache.invalidate(&CacheKey::Products).await;
    }
}

/// Decode a response body, logging the body on failure.
fn decode<T>(body: &str) -> Result<T, PersistenceError>
where
    T: DeserializeOwned + Validated,
{
    let value: T = serde_json::from_str(body).map_err(|e| {
        tracing::error!(
            error = %e,
            body = %excerpt(body),
            "Failed to decode persistence service response"
        );
        PersistenceError::Decode(e)
    })?;
    value.check()?;
    Ok(value)
}

fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT).collect()
}

#[async_trait]
impl PersistenceAdapter for HttpPersistence {
    // =========================================================================
    // Product Methods
    // =========================================================================

    #[instrument(skip(self))]
    async fn list_products(&self) -> Result<Vec<Product>, PersistenceError> {
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&CacheKey::Products).await
        {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let url = self.url(&[PRODUCTS])?;
        let products: Vec<Product> = self.fetch(self.inner.client.get(url)).await?;

        self.inner
            .cache
            .insert(CacheKey::Products, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn get_product(&self, id: ProductId) -> Result<Product, PersistenceError> {
        let url = self.url(&[PRODUCTS, &id.to_string()])?;
        self.fetch(self.inner.client.get(url)).await
    }

    #[instrument(skip(self, product), fields(product_id = %product.id))]
    async fn create_product(&self, product: &Product) -> Result<Product, PersistenceError> {
        let url = self.url(&[PRODUCTS])?;
        let created = self.write(reqwest::Method::POST, url, product).await?;
        self.invalidate_products().await;
        Ok(created)
    }

    #[instrument(skip(self, product), fields(product_id = %product.id))]
    async fn replace_product(&self, product: &Product) -> Result<Product, PersistenceError> {
        let url = self.url(&[PRODUCTS, &product.id.to_string()])?;
        let replaced = self.write(reqwest::Method::PUT, url, product).await?;
        self.invalidate_products().await;
        Ok(replaced)
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn delete_product(&self, id: ProductId) -> Result<(), PersistenceError> {
        let url = self.url(&[PRODUCTS, &id.to_string()])?;
        self.send(self.inner.client.delete(url)).await?;
        self.invalidate_products().await;
        Ok(())
    }

    // =========================================================================
    // Category Methods
    // =========================================================================

    #[instrument(skip(self))]
    async fn list_categories(&self) -> Result<Vec<Category>, PersistenceError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let url = self.url(&[CATEGORIES])?;
        let categories: Vec<Category> = self.fetch(self.inner.client.get(url)).await?;

        self.inner
            .cache
            .insert(
                CacheKey::Categories,
                CacheValue::Categories(categories.clone()),
            )
            .await;

        Ok(categories)
    }

    #[instrument(skip(self), fields(category_id = %id))]
    async fn get_category(&self, id: CategoryId) -> Result<Category, PersistenceError> {
        let url = self.url(&[CATEGORIES, &id.to_string()])?;
        self.fetch(self.inner.client.get(url)).await
    }

    // =========================================================================
    // Order Methods
    // =========================================================================

    #[instrument(skip(self))]
    async fn list_orders(&self) -> Result<Vec<Order>, PersistenceError> {
        let url = self.url(&[ORDERS])?;
        self.fetch(self.inner.client.get(url)).await
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn list_orders_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, PersistenceError> {
        let url = self.user_filtered_url(ORDERS, user_id)?;
        self.fetch(self.inner.client.get(url)).await
    }

    #[instrument(skip(self, order), fields(order_id = %order.id))]
    async fn create_order(&self, order: &Order) -> Result<Order, PersistenceError> {
        let url = self.url(&[ORDERS])?;
        self.write(reqwest::Method::POST, url, order).await
    }

    #[instrument(skip(self, order), fields(order_id = %order.id))]
    async fn replace_order(&self, order: &Order) -> Result<Order, PersistenceError> {
        let url = self.url(&[ORDERS, order.id.as_str()])?;
        self.write(reqwest::Method::PUT, url, order).await
    }

    // =========================================================================
    // Address Methods
    // =========================================================================

    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn list_addresses_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Address>, PersistenceError> {
        let url = self.user_filtered_url(ADDRESSES, user_id)?;
        self.fetch(self.inner.client.get(url)).await
    }

    #[instrument(skip(self, address), fields(address_id = %address.id))]
    async fn create_address(&self, address: &Address) -> Result<Address, PersistenceError> {
        let url = self.url(&[ADDRESSES])?;
        self.write(reqwest::Method::POST, url, address).await
    }

    #[instrument(skip(self, address), fields(address_id = %address.id))]
    async fn replace_address(&self, address: &Address) -> Result<Address, PersistenceError> {
        let url = self.url(&[ADDRESSES, address.id.as_str()])?;
        self.write(reqwest::Method::PUT, url, address).await
    }

    #[instrument(skip(self), fields(address_id = %id))]
    async fn delete_address(&self, id: &AddressId) -> Result<(), PersistenceError> {
        let url = self.url(&[ADDRESSES, id.as_str()])?;
        self.send(self.inner.client.delete(url)).await?;
        Ok(())
    }
}
