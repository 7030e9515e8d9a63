//! HTTP route handlers for the cashier front-end.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Cashier screen (loads on first visit)
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Backend reachability check
//! POST /retry                  - Reload after a failed load, redirect to /
//!
//! # Catalog (HTMX fragments)
//! GET  /products?kategori=ID   - Category filter and product grid
//!
//! # Cart (HTMX fragments, trigger cart-updated)
//! POST /cart/add               - Add one unit of a product
//! POST /cart/update            - Set an item quantity (below 1 removes)
//! POST /cart/remove            - Remove an item
//! POST /cart/clear             - Remove every item
//!
//! # Checkout
//! POST /checkout               - Check out, returns the cart with a receipt
//! ```

pub mod cart;
pub mod checkout;
pub mod home;
pub mod products;

use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
}

/// Create all page and fragment routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/retry", post(home::retry))
        .route("/products", get(products::index))
        .nest("/cart", cart_routes())
        .route("/checkout", post(checkout::checkout))
}

/// Build the complete application: routes, health checks, static assets and
/// the tracing middleware.
///
/// Sentry layers are added by the binary.
pub fn app(state: AppState) -> Router {
    let static_dir = ServeDir::new(&state.config().static_dir);
    let request_context = middleware::from_fn_with_state(state.clone(), request_id_middleware);

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes())
        .nest_service("/static", static_dir)
        .with_state(state)
        .layer(request_context)
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                    backend = tracing::field::Empty,
                )
            }),
        )
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check the backend.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the backend does not answer at the
/// current endpoint. Does not retry or scan ports.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    if state.api().resolver().is_reachable().await {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
