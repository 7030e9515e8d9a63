//! Client for the Kasir mock backend.
//!
//! # Architecture
//!
//! - One shared `reqwest::Client` carries the timeout and JSON headers
//! - [`ConnectionResolver`] owns the current backend endpoint and re-resolves
//!   it before every request, scanning nearby ports when it stops answering
//! - [`KasirApi`] exposes the category, product and cart collections
//! - The backend is source of truth - NO local cache, every call hits it
//!
//! # Example
//!
//! ```rust,ignore
//! use kasir_web::api::KasirApi;
//!
//! let api = KasirApi::new(&config.api)?;
//!
//! let categories = api.get_categories().await?;
//! let cart = api.get_cart().await?;
//! let outcome = api.clear_cart().await?;
//! assert!(outcome.is_complete());
//! ```

mod client;
pub mod probe;
mod resolver;

pub use client::{ClearFailure, ClearOutcome, KasirApi};
pub use resolver::{ApiEndpoint, ConnectionResolver, Unreachable};

use thiserror::Error;

/// Shown when no backend answers on the configured URL or any scanned port.
pub const CONNECTION_FAILED_MESSAGE: &str =
    "Tidak dapat terhubung ke server. Pastikan JSON Server berjalan.";

/// Backend operations, each with its own user-facing failure message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    GetCategories,
    GetProducts,
    GetProductsByCategory,
    GetCart,
    AddToCart,
    UpdateCartItem,
    RemoveFromCart,
    ClearCart,
}

impl Operation {
    /// Message shown to the cashier when this operation fails.
    #[must_use]
    pub const fn failure_message(self) -> &'static str {
        match self {
            Self::GetCategories => "Gagal memuat kategori. Pastikan JSON Server berjalan.",
            Self::GetProducts => "Gagal memuat produk. Pastikan JSON Server berjalan.",
            Self::GetProductsByCategory => "Gagal memuat produk berdasarkan kategori.",
            Self::GetCart => "Gagal memuat keranjang.",
            Self::AddToCart => "Gagal menambahkan item ke keranjang.",
            Self::UpdateCartItem => "Gagal mengupdate item di keranjang.",
            Self::RemoveFromCart => "Gagal menghapus item dari keranjang.",
            Self::ClearCart => "Gagal mengosongkan keranjang.",
        }
    }

    /// Stable name used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::GetCategories => "get_categories",
            Self::GetProducts => "get_products",
            Self::GetProductsByCategory => "get_products_by_category",
            Self::GetCart => "get_cart",
            Self::AddToCart => "add_to_cart",
            Self::UpdateCartItem => "update_cart_item",
            Self::RemoveFromCart => "remove_from_cart",
            Self::ClearCart => "clear_cart",
        }
    }
}

/// Errors that can occur when talking to the backend.
///
/// `Display` yields only the cashier-facing message; the underlying cause is
/// kept as the error `source()` for logs and Sentry.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No backend answered within the retry policy.
    #[error("{}", CONNECTION_FAILED_MESSAGE)]
    Unreachable {
        operation: Operation,
        #[source]
        source: Unreachable,
    },

    /// The request failed in flight or its body could not be decoded.
    #[error("{}", .operation.failure_message())]
    Transport {
        operation: Operation,
        #[source]
        source: reqwest::Error,
    },

    /// The backend answered with a non-success status.
    #[error("{}", .operation.failure_message())]
    Status {
        operation: Operation,
        status: reqwest::StatusCode,
    },

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl ApiError {
    /// The operation that failed, if the error came from one.
    #[must_use]
    pub const fn operation(&self) -> Option<Operation> {
        match self {
            Self::Unreachable { operation, .. }
            | Self::Transport { operation, .. }
            | Self::Status { operation, .. } => Some(*operation),
            Self::Client(_) => None,
        }
    }

    /// Whether the backend could not be reached at all.
    #[must_use]
    pub const fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable { .. })
    }

    /// Diagnostic description of the underlying cause.
    #[must_use]
    pub fn cause(&self) -> String {
        match self {
            Self::Unreachable { source, .. } => source.to_string(),
            Self::Transport { source, .. } | Self::Client(source) => source.to_string(),
            Self::Status { status, .. } => format!("HTTP {status}"),
        }
    }
}
