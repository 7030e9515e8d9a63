//! Kasir Core - Shared domain types.
//!
//! This crate provides the records exchanged with the Kasir backend and the
//! values derived from them:
//! - `web` - Cashier screen and API client
//! - `cli` - Operator tools for probing the backend and managing the cart
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, rupiah amounts and customer names
//! - [`catalog`] - Categories and products
//! - [`cart`] - Cart records and totals
//! - [`order`] - Checkout snapshots

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod order;
pub mod types;

pub use cart::{CartItem, CartSummary, NewCartItem};
pub use catalog::{Category, Product};
pub use order::{Order, OrderError, OrderLine};
pub use types::*;
