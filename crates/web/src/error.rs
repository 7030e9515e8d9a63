//! Unified error handling with Sentry integration.
//!
//! Full-page handlers return `Result<T, AppError>`; the error is rendered as
//! the error screen with a matching status code. Fragment handlers render
//! notices instead and never fail the page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::page::PageError;

/// Command that starts the mock backend, shown on the error screen.
pub const BACKEND_HINT: &str = "npx json-server --watch db.json --port 3001";

/// Application-level error type for the cashier front-end.
#[derive(Debug, Error)]
pub enum AppError {
    /// A cashier action failed.
    #[error(transparent)]
    Page(#[from] PageError),

    /// An earlier load failed and nothing has been retried since; the
    /// message is already user-facing.
    #[error("{0}")]
    Unavailable(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Page(err) => match err {
                PageError::Api(_) | PageError::CartNotCleared { .. } => StatusCode::BAD_GATEWAY,
                PageError::ItemNotFound(_) | PageError::ProductNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                PageError::EmptyCart
                | PageError::MissingCustomerName
                | PageError::InvalidCustomerName(_) => StatusCode::UNPROCESSABLE_ENTITY,
            },
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Whether the backend may come back, so retrying makes sense.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Unavailable(_) | Self::Page(PageError::Api(_) | PageError::CartNotCleared { .. })
        )
    }
}

/// Error screen.
#[derive(Template, WebTemplate)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub status: u16,
    pub message: String,
    pub hint: &'static str,
    pub show_retry: bool,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture backend failures to Sentry
        if matches!(
            self,
            Self::Page(PageError::Api(_) | PageError::CartNotCleared { .. })
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();
        let show_retry = self.is_retryable();
        let template = ErrorTemplate {
            status: status.as_u16(),
            message: self.to_string(),
            hint: BACKEND_HINT,
            show_retry,
        };

        (status, template).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use kasir_core::{CartItemId, ProductId};

    #[test]
    fn test_app_error_display() {
        let err = AppError::Unavailable("Server mati".to_string());
        assert_eq!(err.to_string(), "Server mati");

        let err = AppError::Page(PageError::EmptyCart);
        assert_eq!(
            err.to_string(),
            "Keranjang kosong! Silakan tambahkan produk ke keranjang terlebih dahulu."
        );
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            let response = err.into_response();
            response.status()
        }

        assert_eq!(
            get_status(AppError::Page(PageError::MissingCustomerName)),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            get_status(AppError::Page(PageError::ItemNotFound(CartItemId::new(1)))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Page(PageError::ProductNotFound(ProductId::new(1)))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Page(PageError::CartNotCleared { remaining: 2 })),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            get_status(AppError::Unavailable("down".to_string())),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_retry_offered_only_for_backend_failures() {
        assert!(AppError::Unavailable("x".to_string()).is_retryable());
        assert!(AppError::Page(PageError::CartNotCleared { remaining: 1 }).is_retryable());
        assert!(!AppError::Page(PageError::EmptyCart).is_retryable());
        assert!(!AppError::Page(PageError::ItemNotFound(CartItemId::new(1))).is_retryable());
    }
}
