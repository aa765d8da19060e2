//! Wishlists follow the signed-in user across sessions.

use storekeeper_core::ProductId;
use storekeeper_integration_tests::{World, identity, product};
use storekeeper_storefront::StaticAuth;

#[tokio::test]
async fn test_wishlist_restored_after_sign_out() {
    let world = World::new([product(1, 10, 6), product(2, 4, 3)]);
    let auth = StaticAuth::new(Some(identity("u1")));
    let mut shopper = world.shopper();
    shopper.sign_in(&auth).await.expect("signed in");

    shopper
        .wishlist_mut()
        .add_to_wishlist(product(1, 10, 6))
        .expect("saved");
    shopper
        .wishlist_mut()
        .add_to_wishlist(product(2, 4, 3))
        .expect("saved");
    shopper
        .wishlist_mut()
        .add_to_wishlist(product(2, 4, 3))
        .expect("saved again");
    assert_eq!(shopper.wishlist().items().len(), 2);

    shopper.sign_out(&auth).await.expect("signed out");
    assert!(shopper.identity().is_none());
    assert!(shopper.wishlist().items().is_empty());

    shopper.sign_in(&auth).await.expect("signed in again");
    assert!(shopper.wishlist().is_in_wishlist(ProductId::new(1)));
    assert!(shopper.wishlist().is_in_wishlist(ProductId::new(2)));
}

#[tokio::test]
async fn test_wishlists_are_per_user() {
    let world = World::new([product(1, 10, 5)]);
    let mut first = world.signed_in("u1").await;
    first
        .wishlist_mut()
        .add_to_wishlist(product(1, 10, 5))
        .expect("saved");

    let second = world.signed_in("u2").await;
    assert!(second.wishlist().items().is_empty());

    first
        .wishlist_mut()
        .remove_from_wishlist(ProductId::new(1))
        .expect("removed");
    let reloaded = world.signed_in("u1").await;
    assert!(reloaded.wishlist().items().is_empty());
}

#[tokio::test]
async fn test_signed_out_changes_are_not_stored() {
    let world = World::new([product(1, 10, 5)]);
    let mut guest = world.shopper();
    guest
        .cart_mut()
        .add_to_cart(product(1, 10, 5))
        .expect("guest cart updated");
    guest
        .wishlist_mut()
        .add_to_wishlist(product(1, 10, 5))
        .expect("guest wishlist updated");

    assert!(world.local.is_empty());
}
