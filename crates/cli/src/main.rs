//! Storekeeper CLI - storefront and admin operations against the REST service.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! sk-cli products list --search mug --sort price-asc
//!
//! # Shop as the configured user (STOREKEEPER_USER_ID)
//! sk-cli cart add 3
//! sk-cli addresses add --name "Ada" --street "1 Road" --city London \
//!     --state LDN --zip-code N1 --country UK
//! sk-cli orders place
//!
//! # Administer
//! sk-cli admin orders set-status ORD-1A2B shipped
//! sk-cli admin stock set 3 40
//! sk-cli admin stock low
//! ```
//!
//! # Commands
//!
//! - `products` - Browse products
//! - `cart` / `wishlist` - Manage the signed-in user's stores
//! - `addresses` - Manage delivery addresses
//! - `orders` - Place orders and view order history
//! - `admin` - Order board and restocking

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storekeeper_core::{CategoryId, OrderId, OrderStatus, ProductId};
use storekeeper_storefront::{ProductSort, StorefrontConfig};

mod commands;

use commands::Context;

#[derive(Parser)]
#[command(name = "sk-cli")]
#[command(author, version, about = "Storekeeper storefront and admin client")]
struct Cli {
    /// Print records as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse products
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage the wishlist
    Wishlist {
        #[command(subcommand)]
        action: WishlistAction,
    },
    /// Manage delivery addresses
    Addresses {
        #[command(subcommand)]
        action: AddressesAction,
    },
    /// Place and list orders
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
    /// Administrator operations
    Admin {
        #[command(subcommand)]
        area: AdminArea,
    },
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List products
    List {
        /// Case-insensitive search over name and description
        #[arg(short, long)]
        search: Option<String>,

        /// Only products in this category
        #[arg(short, long)]
        category: Option<CategoryId>,

        /// Sort order (`name-asc`, `name-desc`, `price-asc`, `price-desc`,
        /// `stock-asc`, `stock-desc`)
        #[arg(long)]
        sort: Option<ProductSort>,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart contents and totals
    Show,
    /// Add one unit of a product
    Add { product: ProductId },
    /// Set a line's quantity (zero or less removes it)
    Set {
        product: ProductId,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a line
    Remove { product: ProductId },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum WishlistAction {
    /// Show saved products
    Show,
    /// Save a product
    Add { product: ProductId },
    /// Remove a saved product
    Remove { product: ProductId },
    /// Remove every saved product
    Clear,
}

#[derive(Subcommand)]
enum AddressesAction {
    /// List delivery addresses
    List,
    /// Add a delivery address (the first one becomes the default)
    Add(AddressArgs),
}

#[derive(Args)]
struct AddressArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    street: String,
    #[arg(long)]
    city: String,
    #[arg(long)]
    state: String,
    #[arg(long)]
    zip_code: String,
    #[arg(long)]
    country: String,
}

#[derive(Subcommand)]
enum OrdersAction {
    /// Place an order for the current cart
    Place {
        /// Address to ship to (defaults to the default address)
        #[arg(short, long)]
        address: Option<String>,
    },
    /// List your orders, newest first
    List,
}

#[derive(Subcommand)]
enum AdminArea {
    /// Order board
    Orders {
        #[command(subcommand)]
        action: AdminOrdersAction,
    },
    /// Stock levels
    Stock {
        #[command(subcommand)]
        action: AdminStockAction,
    },
}

#[derive(Subcommand)]
enum AdminOrdersAction {
    /// List every order, newest first
    List {
        /// Only orders with this status (`on-process`, `shipped`, `delivered`)
        #[arg(short, long)]
        status: Option<OrderStatus>,
    },
    /// Set an order's status (any direction)
    SetStatus { order: OrderId, status: OrderStatus },
}

#[derive(Subcommand)]
enum AdminStockAction {
    /// List every product with its stock
    List,
    /// List products at or below the low-stock threshold
    Low,
    /// Set a product's stock to an absolute value
    Set {
        product: ProductId,
        #[arg(allow_negative_numbers = true)]
        stock: i64,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = StorefrontConfig::from_env();
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "storekeeper=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result = match config {
        Ok(config) => run(cli, &config).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

async fn run(cli: Cli, config: &StorefrontConfig) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::new(config, cli.json)?;

    match cli.command {
        Commands::Products { action } => match action {
            ProductsAction::List {
                search,
                category,
                sort,
            } => commands::shop::list_products(&ctx, search, category, sort).await?,
        },
        Commands::Cart { action } => {
            let mut shopper = ctx.sign_in().await?;
            match action {
                CartAction::Show => {}
                CartAction::Add { product } => {
                    commands::shop::add_to_cart(&ctx, &mut shopper, product).await?;
                }
                CartAction::Set { product, quantity } => {
                    shopper.cart_mut().update_quantity(product, quantity)?;
                }
                CartAction::Remove { product } => shopper.cart_mut().remove_from_cart(product)?,
                CartAction::Clear => shopper.cart_mut().clear_cart()?,
            }
            ctx.output().cart(shopper.cart())?;
        }
        Commands::Wishlist { action } => {
            let mut shopper = ctx.sign_in().await?;
            match action {
                WishlistAction::Show => {}
                WishlistAction::Add { product } => {
                    commands::shop::add_to_wishlist(&ctx, &mut shopper, product).await?;
                }
                WishlistAction::Remove { product } => {
                    shopper.wishlist_mut().remove_from_wishlist(product)?;
                }
                WishlistAction::Clear => shopper.wishlist_mut().clear()?,
            }
            ctx.output().products(shopper.wishlist().items())?;
        }
        Commands::Addresses { action } => {
            let shopper = ctx.sign_in().await?;
            match action {
                AddressesAction::List => commands::shop::list_addresses(&ctx, &shopper).await?,
                AddressesAction::Add(args) => {
                    commands::shop::add_address(&ctx, &shopper, args.into_draft()).await?;
                }
            }
        }
        Commands::Orders { action } => {
            let mut shopper = ctx.sign_in().await?;
            match action {
                OrdersAction::Place { address } => {
                    commands::shop::place_order(&ctx, &mut shopper, address).await?;
                }
                OrdersAction::List => commands::shop::list_orders(&ctx, &shopper).await?,
            }
        }
        Commands::Admin { area } => match area {
            AdminArea::Orders { action } => match action {
                AdminOrdersAction::List { status } => {
                    commands::admin::list_orders(&ctx, status).await?;
                }
                AdminOrdersAction::SetStatus { order, status } => {
                    commands::admin::set_status(&ctx, &order, status).await?;
                }
            },
            AdminArea::Stock { action } => match action {
                AdminStockAction::List => commands::admin::list_stock(&ctx, false).await?,
                AdminStockAction::Low => commands::admin::list_stock(&ctx, true).await?,
                AdminStockAction::Set { product, stock } => {
                    commands::admin::restock(&ctx, product, stock).await?;
                }
            },
        },
    }
    Ok(())
}

impl AddressArgs {
    fn into_draft(self) -> storekeeper_core::AddressDraft {
        storekeeper_core::AddressDraft {
            name: self.name,
            street: self.street,
            city: self.city,
            state: self.state,
            zip_code: self.zip_code,
            country: self.country,
        }
    }
}
