//! Command implementations and shared plumbing.

pub mod admin;
pub mod shop;

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use storekeeper_core::{Address, CartItem, Order, Product, format_price};
use storekeeper_storefront::{
    CartStore, FileStore, HttpPersistence, LocalStore, PersistenceAdapter, PersistenceError,
    Shopper, StaticAuth, StorefrontConfig, StorefrontError, local_store::LocalStoreError,
};

/// Errors raised by a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// The storefront or admin operation failed.
    #[error(transparent)]
    Storefront(#[from] StorefrontError),

    /// A command-line argument was rejected.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// HTTP client could not be built.
    #[error("Failed to create persistence client: {0}")]
    Client(#[from] PersistenceError),

    /// Data directory could not be opened.
    #[error("Failed to open data directory: {0}")]
    DataDir(#[from] LocalStoreError),

    /// Output could not be encoded.
    #[error("Failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Adapters and identity shared by every command.
pub struct Context {
    adapter: Arc<dyn PersistenceAdapter>,
    local: Arc<dyn LocalStore>,
    auth: StaticAuth,
    json: bool,
}

impl Context {
    /// Build the HTTP adapter and file store from `config`.
    ///
    /// # Errors
    ///
    /// Returns `CliError` if the client or data directory cannot be set up.
    pub fn new(config: &StorefrontConfig, json: bool) -> Result<Self, CliError> {
        tracing::debug!(api = ?config.api, data_dir = %config.data_dir.display(), "Using configuration");
        Ok(Self {
            adapter: Arc::new(HttpPersistence::new(&config.api)?),
            local: Arc::new(FileStore::open(&config.data_dir)?),
            auth: StaticAuth::from_env(),
            json,
        })
    }

    pub fn adapter(&self) -> Arc<dyn PersistenceAdapter> {
        self.adapter.clone()
    }

    /// A shopper signed in as the configured user.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Auth` if no user is configured.
    pub async fn sign_in(&self) -> Result<Shopper, StorefrontError> {
        let mut shopper = Shopper::new(self.adapter(), self.local.clone());
        shopper.sign_in(&self.auth).await?;
        Ok(shopper)
    }

    pub const fn output(&self) -> Output {
        Output { json: self.json }
    }
}

/// Renders records as plain-text tables or JSON on stdout.
#[derive(Clone, Copy)]
pub struct Output {
    json: bool,
}

#[allow(clippy::print_stdout)]
impl Output {
    fn emit<T: Serialize + ?Sized>(self, value: &T, text: impl FnOnce() -> String) -> Result<(), CliError> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            println!("{}", text());
        }
        Ok(())
    }

    pub fn products(self, products: &[Product]) -> Result<(), CliError> {
        self.emit(products, || {
            if products.is_empty() {
                return "No products.".to_string();
            }
            products
                .iter()
                .map(|p| {
                    format!(
                        "{:>6}  {:<32} {:>10}  stock {:>5}",
                        p.id.as_i64(),
                        p.name,
                        format_price(p.price),
                        p.stock
                    )
                })
                .collect::<Vec<_>>()
                .join("\n")
        })
    }

    pub fn cart(self, cart: &CartStore) -> Result<(), CliError> {
        self.emit(cart.items(), || {
            if cart.is_empty() {
                return "Cart is empty.".to_string();
            }
            let mut lines: Vec<String> = cart.items().iter().map(cart_line).collect();
            lines.push(format!(
                "{} item(s), total {}",
                cart.total_items(),
                format_price(cart.total_price())
            ));
            lines.join("\n")
        })
    }

    pub fn addresses(self, addresses: &[Address], selected: Option<&Address>) -> Result<(), CliError> {
        self.emit(addresses, || {
            if addresses.is_empty() {
                return "No addresses.".to_string();
            }
            addresses
                .iter()
                .map(|a| {
                    let marker = if selected.is_some_and(|s| s.id == a.id) { '*' } else { ' ' };
                    let default = if a.is_default { " (default)" } else { "" };
                    format!("{marker} {}  {}{default}", a.id, a.one_line())
                })
                .collect::<Vec<_>>()
                .join("\n")
        })
    }

    pub fn order(self, order: &Order) -> Result<(), CliError> {
        self.emit(order, || {
            let mut lines = vec![order_line(order)];
            lines.extend(order.items.iter().map(|item| {
                format!(
                    "    {} x {} @ {} = {}",
                    item.quantity,
                    item.name,
                    format_price(item.price),
                    format_price(item.total)
                )
            }));
            lines.push(format!("    ship to {}", order.shipping_address.one_line()));
            lines.push(format!(
                "    estimated delivery {}",
                order.estimated_delivery.format("%Y-%m-%d")
            ));
            lines.join("\n")
        })
    }

    pub fn orders(self, orders: &[&Order]) -> Result<(), CliError> {
        self.emit(orders, || {
            if orders.is_empty() {
                return "No orders.".to_string();
            }
            orders
                .iter()
                .map(|order| order_line(order))
                .collect::<Vec<_>>()
                .join("\n")
        })
    }

    pub fn message(self, text: &str) {
        if !self.json {
            println!("{text}");
        }
    }
}

fn cart_line(item: &CartItem) -> String {
    format!(
        "{:>6}  {:<32} {:>3} x {:>10} = {:>10}",
        item.id().as_i64(),
        item.product.name,
        item.quantity,
        format_price(item.product.price),
        format_price(item.line_total())
    )
}

fn order_line(order: &Order) -> String {
    format!(
        "{}  {}  {:<10}  {:>3} unit(s)  {:>10}",
        order.id,
        order.order_date.format("%Y-%m-%d %H:%M"),
        order.status.label(),
        order.unit_count(),
        format_price(order.total_amount)
    )
}
