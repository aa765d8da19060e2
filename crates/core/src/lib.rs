//! Storekeeper Core - Shared types library.
//!
//! This crate provides the record schemas used across all Storekeeper components:
//! - `storefront` - Customer-side cart, wishlist, checkout and order history
//! - `admin` - Stock adjustment and order status management
//! - `cli` - Command-line surface over both
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no storage.
//! Records are decoded and validated here so that nothing untyped crosses the
//! persistence boundary.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, prices, statuses and the Product/Order/Address records

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
