//! Catalog records: products, categories and the snapshots held by carts
//! and wishlists.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use super::id::{CategoryId, ProductId};
use super::price::{amount, line_total};

/// A decoded record violated its schema.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecordError {
    /// Product price below zero.
    #[error("product {0} has a negative price")]
    NegativePrice(ProductId),
    /// Order line with a zero quantity.
    #[error("order line for product {0} has zero quantity")]
    ZeroQuantity(ProductId),
    /// Required text field was blank.
    #[error("{record} field `{field}` is empty")]
    EmptyField {
        /// Record kind (e.g. `product`).
        record: &'static str,
        /// Field name as stored.
        field: &'static str,
    },
}

/// A catalog product.
///
/// Fields the storefront does not model are kept in `extra` so that a
/// full-document replace writes them back untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(with = "amount")]
    pub price: Decimal,
    pub stock: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub image: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Product {
    /// Whether the product can be added to a cart.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Check the invariants serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NegativePrice`] for a price below zero and
    /// [`RecordError::EmptyField`] for a blank name.
    pub fn validate(&self) -> Result<(), RecordError> {
        if self.price < Decimal::ZERO {
            return Err(RecordError::NegativePrice(self.id));
        }
        if self.name.is_empty() {
            return Err(RecordError::EmptyField {
                record: "product",
                field: "name",
            });
        }
        Ok(())
    }
}

/// A product category. Read-only from the storefront's perspective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A wishlist entry: a plain product snapshot.
pub type WishlistItem = Product;

/// A cart line: a product snapshot plus a quantity of at least one.
///
/// Serialized flat, i.e. the product's fields with `quantity` alongside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(flatten)]
    pub product: Product,
    pub quantity: u32,
}

impl CartItem {
    /// A new line holding one unit of `product`.
    #[must_use]
    pub const fn new(product: Product) -> Self {
        Self {
            product,
            quantity: 1,
        }
    }

    /// The product ID this line is keyed by.
    #[must_use]
    pub const fn id(&self) -> ProductId {
        self.product.id
    }

    /// `price × quantity` for this line.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        line_total(self.product.price, self.quantity)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product_json() -> Value {
        serde_json::json!({
            "id": 3,
            "name": "Desk Lamp",
            "description": "Warm light",
            "price": 24.5,
            "stock": 12,
            "categoryId": 2,
            "image": "lamp.png",
            "rating": 4.7
        })
    }

    #[test]
    fn test_product_decodes_and_keeps_unknown_fields() {
        let product: Product = serde_json::from_value(product_json()).unwrap();
        assert_eq!(product.id, ProductId::new(3));
        assert_eq!(product.price, Decimal::new(245, 1));
        assert_eq!(product.category_id, Some(CategoryId::new(2)));
        assert_eq!(product.extra.get("rating"), Some(&serde_json::json!(4.7)));

        let written = serde_json::to_value(&product).unwrap();
        assert_eq!(written["rating"], serde_json::json!(4.7));
        assert_eq!(written["categoryId"], serde_json::json!(2));
    }

    #[test]
    fn test_product_rejects_negative_stock() {
        let mut json = product_json();
        json["stock"] = serde_json::json!(-1);
        assert!(serde_json::from_value::<Product>(json).is_err());
    }

    #[test]
    fn test_product_validate_negative_price() {
        let mut json = product_json();
        json["price"] = serde_json::json!(-3);
        let product: Product = serde_json::from_value(json).unwrap();
        assert_eq!(
            product.validate(),
            Err(RecordError::NegativePrice(ProductId::new(3)))
        );
    }

    #[test]
    fn test_cart_item_is_flat() {
        let product: Product = serde_json::from_value(product_json()).unwrap();
        let item = CartItem {
            product,
            quantity: 2,
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["quantity"], serde_json::json!(2));
        assert_eq!(json["name"], serde_json::json!("Desk Lamp"));

        let back: CartItem = serde_json::from_value(json).unwrap();
        assert_eq!(back.quantity, 2);
        assert!(!back.product.extra.contains_key("quantity"));
        assert_eq!(back.line_total(), Decimal::from(49));
    }
}
