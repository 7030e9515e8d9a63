//! REST operations against the backend collections.

use std::sync::Arc;

use futures::future::join_all;
use kasir_core::{CartItem, CartItemId, Category, CategoryId, NewCartItem, Product};
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::{info, instrument, warn};

use crate::config::ApiConfig;

use super::resolver::{ApiEndpoint, ConnectionResolver};
use super::{ApiError, Operation};

// =============================================================================
// KasirApi
// =============================================================================

/// Client for the category, product and cart collections.
///
/// Cheap to clone; clones share the HTTP connection pool and the resolved
/// endpoint.
#[derive(Clone)]
pub struct KasirApi {
    inner: Arc<KasirApiInner>,
}

struct KasirApiInner {
    http: reqwest::Client,
    resolver: ConnectionResolver,
}

/// A cart record that could not be deleted while clearing the cart.
#[derive(Debug)]
pub struct ClearFailure {
    pub id: CartItemId,
    pub error: ApiError,
}

/// Result of clearing the cart.
///
/// `remaining` comes from re-reading the cart after every delete has
/// settled, so it reflects the backend rather than the delete results.
#[derive(Debug)]
pub struct ClearOutcome {
    /// Number of delete requests issued.
    pub requested: usize,
    pub failures: Vec<ClearFailure>,
    pub remaining: Vec<CartItem>,
}

impl ClearOutcome {
    /// Number of deletes that succeeded.
    #[must_use]
    pub fn deleted(&self) -> usize {
        self.requested.saturating_sub(self.failures.len())
    }

    /// Whether the backend cart is now empty.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.remaining.is_empty()
    }
}

impl KasirApi {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Client`] if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self {
            inner: Arc::new(KasirApiInner {
                resolver: ConnectionResolver::new(http.clone(), config),
                http,
            }),
        })
    }

    /// The resolver that picks the backend endpoint.
    #[must_use]
    pub fn resolver(&self) -> &ConnectionResolver {
        &self.inner.resolver
    }

    /// Resolve a reachable endpoint on behalf of `operation`.
    async fn endpoint(&self, operation: Operation) -> Result<ApiEndpoint, ApiError> {
        self.inner
            .resolver
            .resolve()
            .await
            .map_err(|source| failed(ApiError::Unreachable { operation, source }))
    }

    /// Send a request and decode its JSON body.
    async fn send_json<T: DeserializeOwned>(
        &self,
        operation: Operation,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = send_checked(operation, request).await?;
        response
            .json::<T>()
            .await
            .map_err(|source| failed(ApiError::Transport { operation, source }))
    }

    // =========================================================================
    // Catalog Methods
    // =========================================================================

    /// Get every category.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or the request fails.
    #[instrument(skip(self))]
    pub async fn get_categories(&self) -> Result<Vec<Category>, ApiError> {
        let operation = Operation::GetCategories;
        let endpoint = self.endpoint(operation).await?;
        let request = self.inner.http.get(endpoint.collection("categories"));
        self.send_json(operation, request).await
    }

    /// Get every product.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or the request fails.
    #[instrument(skip(self))]
    pub async fn get_products(&self) -> Result<Vec<Product>, ApiError> {
        let operation = Operation::GetProducts;
        let endpoint = self.endpoint(operation).await?;
        let request = self.inner.http.get(endpoint.collection("products"));
        self.send_json(operation, request).await
    }

    /// Get the products of one category, filtered by the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or the request fails.
    #[instrument(skip(self), fields(category_id = %category_id))]
    pub async fn get_products_by_category(
        &self,
        category_id: &CategoryId,
    ) -> Result<Vec<Product>, ApiError> {
        let operation = Operation::GetProductsByCategory;
        let endpoint = self.endpoint(operation).await?;
        let request = self
            .inner
            .http
            .get(endpoint.collection("products"))
            .query(&[("kategori", category_id.as_str())]);
        self.send_json(operation, request).await
    }

    // =========================================================================
    // Cart Methods (never cached - mutable state)
    // =========================================================================

    /// Get every cart record.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or the request fails.
    #[instrument(skip(self))]
    pub async fn get_cart(&self) -> Result<Vec<CartItem>, ApiError> {
        self.fetch_cart(Operation::GetCart).await
    }

    async fn fetch_cart(&self, operation: Operation) -> Result<Vec<CartItem>, ApiError> {
        let endpoint = self.endpoint(operation).await?;
        let request = self.inner.http.get(endpoint.collection("cart"));
        self.send_json(operation, request).await
    }

    /// Create a cart record; the backend assigns its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or rejects the record.
    #[instrument(skip(self, item), fields(product_id = %item.product_id))]
    pub async fn add_to_cart(&self, item: &NewCartItem) -> Result<CartItem, ApiError> {
        let operation = Operation::AddToCart;
        let endpoint = self.endpoint(operation).await?;
        let request = self.inner.http.post(endpoint.collection("cart")).json(item);
        self.send_json(operation, request).await
    }

    /// Replace a cart record with `item`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or rejects the record.
    #[instrument(skip(self, item), fields(id = %id, quantity = item.quantity))]
    pub async fn update_cart_item(
        &self,
        id: &CartItemId,
        item: &CartItem,
    ) -> Result<CartItem, ApiError> {
        let operation = Operation::UpdateCartItem;
        let endpoint = self.endpoint(operation).await?;
        let request = self
            .inner
            .http
            .put(endpoint.collection(&format!("cart/{id}")))
            .json(item);
        self.send_json(operation, request).await
    }

    /// Delete one cart record. Any response body is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or the delete fails.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn remove_from_cart(&self, id: &CartItemId) -> Result<(), ApiError> {
        let operation = Operation::RemoveFromCart;
        let endpoint = self.endpoint(operation).await?;
        let request = self
            .inner
            .http
            .delete(endpoint.collection(&format!("cart/{id}")));
        send_checked(operation, request).await.map(drop)
    }

    /// Delete every cart record.
    ///
    /// Reads the cart, fires one delete per record concurrently, waits for
    /// all of them, then reads the cart again. Individual delete failures are
    /// reported in the outcome instead of failing the whole operation.
    ///
    /// # Errors
    ///
    /// Returns an error only if reading the cart fails, before or after the
    /// deletes.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self) -> Result<ClearOutcome, ApiError> {
        let items = self.fetch_cart(Operation::ClearCart).await?;
        let requested = items.len();

        let results = join_all(items.iter().map(|item| async move {
            (item.id.clone(), self.remove_from_cart(&item.id).await)
        }))
        .await;

        let failures: Vec<ClearFailure> = results
            .into_iter()
            .filter_map(|(id, result)| result.err().map(|error| ClearFailure { id, error }))
            .collect();

        let remaining = self.fetch_cart(Operation::ClearCart).await?;

        if failures.is_empty() && remaining.is_empty() {
            info!(requested, "Cart cleared");
        } else {
            warn!(
                requested,
                failed = failures.len(),
                remaining = remaining.len(),
                "Cart only partially cleared"
            );
        }

        Ok(ClearOutcome {
            requested,
            failures,
            remaining,
        })
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Send a request, mapping transport failures and non-2xx statuses.
async fn send_checked(
    operation: Operation,
    request: reqwest::RequestBuilder,
) -> Result<reqwest::Response, ApiError> {
    let response = request
        .send()
        .await
        .map_err(|source| failed(ApiError::Transport { operation, source }))?;

    let status = response.status();
    if !status.is_success() {
        return Err(failed(ApiError::Status { operation, status }));
    }

    Ok(response)
}

/// Log the diagnostic cause of `error` before it is reduced to its message.
fn failed(error: ApiError) -> ApiError {
    tracing::error!(
        operation = error.operation().map_or("client", Operation::name),
        cause = %error.cause(),
        "{error}"
    );
    error
}
