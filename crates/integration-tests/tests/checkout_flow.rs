//! A shopper fills a cart, adds an address and places an order.

use rust_decimal::Decimal;

use storekeeper_core::{OrderStatus, PaymentMethod, ProductId};
use storekeeper_integration_tests::{World, draft, product};
use storekeeper_storefront::StorefrontError;

#[tokio::test]
async fn test_order_placed_from_cart_and_cart_cleared() {
    let world = World::new([product(1, 10, 5), product(2, 3, 40)]);
    let mut shopper = world.signed_in("u1").await;

    for id in [1, 1, 2] {
        let item = shopper
            .catalog()
            .product(ProductId::new(id))
            .await
            .expect("product exists");
        shopper.cart_mut().add_to_cart(item).expect("added to cart");
    }
    assert_eq!(shopper.cart().total_items(), 3);
    assert_eq!(shopper.cart().total_price(), Decimal::from(23));

    let mut checkout = shopper.checkout().await.expect("checkout opens");
    assert!(checkout.addresses().is_empty());
    let address = checkout
        .create_address(draft("Ada"))
        .await
        .expect("address created");
    assert!(address.is_default);
    assert_eq!(checkout.selected_address().map(|a| &a.id), Some(&address.id));

    let order = checkout
        .place_order(shopper.cart_mut())
        .await
        .expect("order placed");

    assert_eq!(order.status, OrderStatus::OnProcess);
    assert_eq!(order.payment_method, PaymentMethod::CashOnDelivery);
    assert_eq!(order.total_amount, Decimal::from(23));
    assert_eq!(order.items.len(), 2);
    assert_eq!(order.shipping_address, address);
    assert_eq!((order.estimated_delivery - order.order_date).num_days(), 7);
    assert_eq!(world.backend.stored_orders(), [order]);
    assert!(shopper.cart().is_empty());

    // The cleared cart is what the next session sees too
    let again = world.signed_in("u1").await;
    assert!(again.cart().is_empty());
}

#[tokio::test]
async fn test_second_address_is_not_default() {
    let world = World::new([]);
    let shopper = world.signed_in("u1").await;

    let mut checkout = shopper.checkout().await.expect("checkout opens");
    let first = checkout.create_address(draft("Home")).await.expect("first");
    let second = checkout.create_address(draft("Work")).await.expect("second");
    assert!(first.is_default);
    assert!(!second.is_default);

    // A fresh checkout preselects the default, not the latest
    let reopened = shopper.checkout().await.expect("checkout reopens");
    assert_eq!(reopened.addresses().len(), 2);
    assert_eq!(reopened.selected_address().map(|a| &a.id), Some(&first.id));
}

#[tokio::test]
async fn test_cart_survives_sessions_per_user() {
    let world = World::new([product(7, 4, 9)]);

    let mut first = world.signed_in("u1").await;
    first
        .cart_mut()
        .add_to_cart(product(7, 4, 9))
        .expect("added to cart");
    first
        .cart_mut()
        .update_quantity(ProductId::new(7), 3)
        .expect("quantity set");

    let same_user = world.signed_in("u1").await;
    assert_eq!(same_user.cart().total_items(), 3);

    let other_user = world.signed_in("u2").await;
    assert!(other_user.cart().is_empty());
}

#[tokio::test]
async fn test_empty_cart_cannot_be_ordered() {
    let world = World::new([]);
    let mut shopper = world.signed_in("u1").await;
    let mut checkout = shopper.checkout().await.expect("checkout opens");
    checkout.create_address(draft("Ada")).await.expect("address created");

    let err = checkout
        .place_order(shopper.cart_mut())
        .await
        .expect_err("empty cart rejected");

    assert!(matches!(err, StorefrontError::PreconditionFailed(_)));
    assert!(world.backend.stored_orders().is_empty());
}

#[tokio::test]
async fn test_order_without_address_is_rejected() {
    let world = World::new([product(1, 10, 5)]);
    let mut shopper = world.signed_in("u1").await;
    shopper
        .cart_mut()
        .add_to_cart(product(1, 10, 5))
        .expect("added to cart");

    let checkout = shopper.checkout().await.expect("checkout opens");
    let err = checkout
        .place_order(shopper.cart_mut())
        .await
        .expect_err("no address selected");

    assert!(matches!(err, StorefrontError::PreconditionFailed(_)));
    assert_eq!(shopper.cart().total_items(), 1);
}

#[tokio::test]
async fn test_failed_placement_keeps_cart() {
    let world = World::new([product(1, 10, 5)]);
    let mut shopper = world.signed_in("u1").await;
    shopper
        .cart_mut()
        .add_to_cart(product(1, 10, 5))
        .expect("added to cart");
    let mut checkout = shopper.checkout().await.expect("checkout opens");
    checkout.create_address(draft("Ada")).await.expect("address created");

    world.backend.set_offline(true);
    let err = checkout
        .place_order(shopper.cart_mut())
        .await
        .expect_err("backend offline");

    assert!(err.is_retryable());
    assert_eq!(shopper.cart().total_items(), 1);
    assert!(checkout.selected_address().is_some());

    world.backend.set_offline(false);
    checkout
        .place_order(shopper.cart_mut())
        .await
        .expect("retry succeeds");
    assert_eq!(world.backend.stored_orders().len(), 1);
}

#[tokio::test]
async fn test_sold_out_product_cannot_be_added() {
    let world = World::new([product(3, 8, 0)]);
    let mut shopper = world.signed_in("u1").await;
    let item = shopper
        .catalog()
        .product(ProductId::new(3))
        .await
        .expect("product exists");

    let err = shopper.cart_mut().add_to_cart(item).expect_err("sold out");
    assert!(matches!(err, StorefrontError::OutOfStock(id) if id == ProductId::new(3)));
    assert!(shopper.cart().is_empty());
}

#[tokio::test]
async fn test_signed_out_shopper_cannot_check_out() {
    let world = World::new([]);
    let shopper = world.shopper();
    assert!(matches!(
        shopper.checkout().await,
        Err(StorefrontError::PreconditionFailed(_))
    ));
}
