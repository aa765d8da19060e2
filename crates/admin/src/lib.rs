//! Storekeeper administrator operations.
//!
//! - [`orders::OrderBoard`] - every order, with unrestricted status changes
//! - [`stock::StockAdjustment`] - absolute restocking and the low-stock view
//!
//! Authorization is left to the persistence service and identity provider;
//! nothing here checks who is calling.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod orders;
pub mod stock;

pub use orders::OrderBoard;
pub use stock::{LOW_STOCK_THRESHOLD, StockAdjustment, low_stock_view};
