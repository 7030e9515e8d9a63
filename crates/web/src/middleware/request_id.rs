//! Request ID middleware for request tracing and correlation.
//!
//! Every request gets an ID, taken from an upstream `x-request-id` header or
//! freshly generated. It is recorded on the trace span, tagged on the Sentry
//! scope and echoed in the response, together with the backend endpoint the
//! request was served against. The endpoint is read again after the handler,
//! so a port switch made while handling the request shows up in the response.

use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use tracing::Span;
use uuid::Uuid;

use crate::state::AppState;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Response header naming the backend endpoint in use after the request.
pub const BACKEND_HEADER: &str = "x-kasir-backend";

/// Middleware that ensures every request has a request ID and records the
/// backend endpoint.
pub async fn request_id_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .filter(|id| !id.is_empty())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);
    let resolver = state.api().resolver();
    let backend = resolver.current().await;

    Span::current().record("request_id", &request_id);
    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
        scope.set_tag("backend", &backend);
    });

    let mut response = next.run(request).await;

    let backend = resolver.current().await;
    Span::current().record("backend", tracing::field::display(&backend));

    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        headers.insert(REQUEST_ID_HEADER, value);
    }
    if let Ok(value) = HeaderValue::from_str(&backend.to_string()) {
        headers.insert(BACKEND_HEADER, value);
    }

    response
}
