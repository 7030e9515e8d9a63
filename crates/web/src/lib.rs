//! Kasir web front-end library.
//!
//! The cashier screen, its controller and the client for the mock JSON REST
//! backend, exposed as a library so the CLI and integration tests can reuse
//! them.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod page;
pub mod routes;
pub mod state;
pub mod views;
