//! Administrator commands: the order board and stock levels.

use storekeeper_admin::{LOW_STOCK_THRESHOLD, OrderBoard, StockAdjustment};
use storekeeper_core::{OrderId, OrderStatus, ProductId};

use super::{CliError, Context};

/// List every order, optionally only those in `status`.
pub async fn list_orders(ctx: &Context, status: Option<OrderStatus>) -> Result<(), CliError> {
    let mut board = OrderBoard::new(ctx.adapter());
    board.load().await?;

    let orders: Vec<_> = match status {
        Some(status) => board.with_status(status).collect(),
        None => board.orders().iter().collect(),
    };
    ctx.output().orders(&orders)?;

    let counts = board.status_counts();
    ctx.output().message(&format!(
        "{} on process, {} shipped, {} delivered",
        counts.on_process, counts.shipped, counts.delivered
    ));
    Ok(())
}

pub async fn set_status(ctx: &Context, id: &OrderId, status: OrderStatus) -> Result<(), CliError> {
    let mut board = OrderBoard::new(ctx.adapter());
    board.load().await?;
    let order = board.set_status(id, status).await?;
    ctx.output()
        .message(&format!("Order {} is now {}.", order.id, order.status.label()));
    ctx.output().order(&order)
}

/// List products with their stock, or only those running low.
pub async fn list_stock(ctx: &Context, low: bool) -> Result<(), CliError> {
    let mut stock = StockAdjustment::new(ctx.adapter());
    stock.load().await?;
    if low {
        ctx.output()
            .message(&format!("Products with {LOW_STOCK_THRESHOLD} or fewer in stock:"));
        ctx.output().products(stock.low_stock())
    } else {
        ctx.output().products(stock.products())
    }
}

/// Set a product's stock to an absolute value.
pub async fn restock(ctx: &Context, id: ProductId, new_stock: i64) -> Result<(), CliError> {
    let mut stock = StockAdjustment::new(ctx.adapter());
    stock.load().await?;
    let product = stock.restock(id, Some(new_stock)).await?;
    ctx.output().message(&format!(
        "{} stock set to {}.",
        product.name, product.stock
    ));
    Ok(())
}
