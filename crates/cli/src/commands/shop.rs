//! Shopper commands: browsing, cart and wishlist additions, addresses, orders.

use storekeeper_core::{AddressDraft, AddressId, CategoryId, Product, ProductId};
use storekeeper_storefront::{Catalog, ProductQuery, ProductSort, Shopper, StorefrontError};

use super::{CliError, Context};

/// List products matching the given filters.
pub async fn list_products(
    ctx: &Context,
    search: Option<String>,
    category: Option<CategoryId>,
    sort: Option<ProductSort>,
) -> Result<(), CliError> {
    let query = ProductQuery {
        search,
        category,
        sort,
    };
    let products = Catalog::new(ctx.adapter()).products(&query).await?;
    ctx.output().products(&products)
}

/// Add one unit of a product, checked against its live stock.
pub async fn add_to_cart(ctx: &Context, shopper: &mut Shopper, id: ProductId) -> Result<(), CliError> {
    let product = shopper.catalog().product(id).await?;
    let name = product.name.clone();
    shopper.cart_mut().add_to_cart(product)?;
    ctx.output().message(&format!("Added {name} to cart."));
    Ok(())
}

/// Save a product for later, checked against its live stock.
pub async fn add_to_wishlist(ctx: &Context, shopper: &mut Shopper, id: ProductId) -> Result<(), CliError> {
    let product = shopper.catalog().product(id).await?;
    ensure_in_stock(&product)?;
    let name = product.name.clone();
    shopper.wishlist_mut().add_to_wishlist(product)?;
    ctx.output().message(&format!("Saved {name} to wishlist."));
    Ok(())
}

/// List the shopper's addresses; `*` marks the one checkout would use.
pub async fn list_addresses(ctx: &Context, shopper: &Shopper) -> Result<(), CliError> {
    let checkout = shopper.checkout().await?;
    ctx.output()
        .addresses(checkout.addresses(), checkout.selected_address())
}

pub async fn add_address(ctx: &Context, shopper: &Shopper, draft: AddressDraft) -> Result<(), CliError> {
    let mut checkout = shopper.checkout().await?;
    let address = checkout.create_address(draft).await?;
    ctx.output().message(&format!("Created address {}.", address.id));
    ctx.output()
        .addresses(checkout.addresses(), checkout.selected_address())
}

/// Place an order for the whole cart, shipping to `address` or the default.
pub async fn place_order(ctx: &Context, shopper: &mut Shopper, address: Option<String>) -> Result<(), CliError> {
    let mut checkout = shopper.checkout().await?;
    if let Some(address) = address {
        let address = address.trim();
        if address.is_empty() {
            return Err(CliError::InvalidArgument("address ID is empty".to_string()));
        }
        checkout.select_address(&AddressId::new(address))?;
    }
    let order = checkout.place_order(shopper.cart_mut()).await?;
    ctx.output().message(&format!("Placed order {}.", order.id));
    ctx.output().order(&order)
}

pub async fn list_orders(ctx: &Context, shopper: &Shopper) -> Result<(), CliError> {
    let history = shopper.order_history().await?;
    let orders: Vec<_> = history.orders().iter().collect();
    ctx.output().orders(&orders)
}

fn ensure_in_stock(product: &Product) -> Result<(), StorefrontError> {
    if product.in_stock() {
        Ok(())
    } else {
        Err(StorefrontError::OutOfStock(product.id))
    }
}
