//! HTTP middleware stack for the cashier front-end.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request, tag the backend endpoint)

pub mod request_id;

pub use request_id::{BACKEND_HEADER, REQUEST_ID_HEADER, request_id_middleware};
