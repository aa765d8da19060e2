//! An administrator restocks a sold-out product and shoppers can buy it again.

use storekeeper_admin::{LOW_STOCK_THRESHOLD, StockAdjustment};
use storekeeper_core::ProductId;
use storekeeper_integration_tests::{World, draft, product};
use storekeeper_storefront::StorefrontError;

#[tokio::test]
async fn test_restock_makes_product_available() {
    let world = World::new([product(1, 10, 0), product(2, 4, 50)]);
    let mut shopper = world.signed_in("u1").await;

    let sold_out = shopper
        .catalog()
        .product(ProductId::new(1))
        .await
        .expect("product exists");
    assert!(shopper.cart_mut().add_to_cart(sold_out).is_err());

    let mut stock = StockAdjustment::new(world.adapter());
    stock.load().await.expect("products load");
    let low: Vec<_> = stock.low_stock().iter().map(|p| p.id).collect();
    assert_eq!(low, [ProductId::new(1)]);

    stock
        .restock(ProductId::new(1), Some(12))
        .await
        .expect("restocked");
    assert!(stock.low_stock().is_empty());

    let restocked = shopper
        .catalog()
        .product(ProductId::new(1))
        .await
        .expect("product exists");
    assert_eq!(restocked.stock, 12);
    shopper
        .cart_mut()
        .add_to_cart(restocked)
        .expect("now in stock");
}

#[tokio::test]
async fn test_threshold_is_inclusive() {
    let at = LOW_STOCK_THRESHOLD;
    let world = World::new([product(1, 1, at), product(2, 1, at + 1)]);
    let mut stock = StockAdjustment::new(world.adapter());
    stock.load().await.expect("products load");

    let low: Vec<_> = stock.low_stock().iter().map(|p| p.id).collect();
    assert_eq!(low, [ProductId::new(1)]);
}

#[tokio::test]
async fn test_invalid_restock_writes_nothing() {
    let world = World::new([product(1, 10, 3)]);
    let mut stock = StockAdjustment::new(world.adapter());
    stock.load().await.expect("products load");

    for value in [None, Some(-4)] {
        let err = stock
            .restock(ProductId::new(1), value)
            .await
            .expect_err("rejected");
        assert!(matches!(err, StorefrontError::Validation(_)));
    }
    let stored = world
        .backend
        .stored_product(ProductId::new(1))
        .expect("product stored");
    assert_eq!(stored.stock, 3);
}

#[tokio::test]
async fn test_placing_an_order_leaves_stock_alone() {
    let world = World::new([product(1, 10, 2)]);
    let mut shopper = world.signed_in("u1").await;
    shopper
        .cart_mut()
        .add_to_cart(product(1, 10, 2))
        .expect("added to cart");
    let mut checkout = shopper.checkout().await.expect("checkout opens");
    checkout
        .create_address(draft("Ada"))
        .await
        .expect("address created");
    checkout
        .place_order(shopper.cart_mut())
        .await
        .expect("order placed");

    let stored = world
        .backend
        .stored_product(ProductId::new(1))
        .expect("product stored");
    assert_eq!(stored.stock, 2);
}
