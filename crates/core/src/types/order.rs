//! Orders and their line snapshots.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::address::Address;
use super::id::{OrderId, ProductId, UserId};
use super::price::amount;
use super::product::{CartItem, RecordError};
use super::status::{OrderStatus, PaymentMethod};

/// A line on a placed order, copied from the cart at checkout.
///
/// Independent of later catalog changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: ProductId,
    pub name: String,
    #[serde(with = "amount")]
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub image: String,
    #[serde(with = "amount")]
    pub total: Decimal,
}

impl From<&CartItem> for OrderItem {
    fn from(item: &CartItem) -> Self {
        Self {
            id: item.product.id,
            name: item.product.name.clone(),
            price: item.product.price,
            quantity: item.quantity,
            image: item.product.image.clone(),
            total: item.line_total(),
        }
    }
}

/// A placed order.
///
/// Items and totals are fixed at creation; only `status` changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    pub items: Vec<OrderItem>,
    #[serde(with = "amount")]
    pub total_amount: Decimal,
    pub shipping_address: Address,
    pub status: OrderStatus,
    pub order_date: DateTime<Utc>,
    pub estimated_delivery: DateTime<Utc>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub order_notes: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Order {
    /// Days between the order date and its estimated delivery.
    pub const DELIVERY_DAYS: i64 = 7;

    /// Note recorded on every order placed through checkout.
    pub const PLACED_NOTE: &'static str = "Order placed successfully";

    /// Estimated delivery date for an order placed at `order_date`.
    #[must_use]
    pub fn estimated_delivery_for(order_date: DateTime<Utc>) -> DateTime<Utc> {
        order_date + Duration::days(Self::DELIVERY_DAYS)
    }

    /// Sum of `total` over all lines.
    #[must_use]
    pub fn items_total(&self) -> Decimal {
        self.items.iter().map(|item| item.total).sum()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn unit_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Check the invariants serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::ZeroQuantity`] for a line with no units.
    pub fn validate(&self) -> Result<(), RecordError> {
        if let Some(item) = self.items.iter().find(|item| item.quantity == 0) {
            return Err(RecordError::ZeroQuantity(item.id));
        }
        Ok(())
    }
}
