//! Core types for Storekeeper.
//!
//! This module provides type-safe wrappers and record schemas for the
//! storefront domain.

pub mod address;
pub mod id;
pub mod order;
pub mod price;
pub mod product;
pub mod status;

pub use address::{Address, AddressDraft, AddressError};
pub use id::*;
pub use order::{Order, OrderItem};
pub use price::{format_price, line_total};
pub use product::{CartItem, Category, Product, RecordError, WishlistItem};
pub use status::*;
