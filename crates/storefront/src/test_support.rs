//! Record builders shared by the unit tests.

#![allow(clippy::unwrap_used)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::Map;

use storekeeper_core::{
    Address, AddressId, CartItem, Order, OrderId, OrderItem, OrderStatus, PaymentMethod, Product,
    ProductId, UserId,
};

use crate::session::Identity;

pub fn product(id: i64, price: i64, stock: u64) -> Product {
    Product {
        id: ProductId::new(id),
        name: format!("Product {id}"),
        description: format!("Description of product {id}"),
        price: Decimal::from(price),
        stock,
        category_id: None,
        image: format!("product-{id}.png"),
        extra: Map::new(),
    }
}

pub fn timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
}

pub fn address(id: &str, user: &str, is_default: bool) -> Address {
    Address {
        id: AddressId::new(id),
        user_id: UserId::new(user),
        name: "Ada Lovelace".to_string(),
        street: "1 Analytical Way".to_string(),
        city: "London".to_string(),
        state: "LDN".to_string(),
        zip_code: "N1 9GU".to_string(),
        country: "UK".to_string(),
        is_default,
        created_at: timestamp(),
        extra: Map::new(),
    }
}

pub fn identity(uid: &str) -> Identity {
    Identity {
        uid: UserId::new(uid),
        email: Some(format!("{uid}@example.com")),
        display_name: Some(format!("User {uid}")),
        photo_url: None,
    }
}

pub fn order(id: &str, user: &str, status: OrderStatus, placed_days_ago: i64) -> Order {
    let order_date = timestamp() - Duration::days(placed_days_ago);
    let line = CartItem {
        product: product(1, 100, 5),
        quantity: 2,
    };
    Order {
        id: OrderId::new(id),
        user_id: UserId::new(user),
        user_email: Some(format!("{user}@example.com")),
        user_name: None,
        items: vec![OrderItem::from(&line)],
        total_amount: line.line_total(),
        shipping_address: address("A1", user, true),
        status,
        order_date,
        estimated_delivery: Order::estimated_delivery_for(order_date),
        payment_method: PaymentMethod::CashOnDelivery,
        order_notes: Order::PLACED_NOTE.to_string(),
        extra: Map::new(),
    }
}
