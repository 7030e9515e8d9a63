//! Core value types for Kasir.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod customer;
pub mod id;
pub mod price;

pub use customer::{CustomerName, CustomerNameError};
pub use id::*;
pub use price::Rupiah;
