//! Cashier screen controller.
//!
//! Owns the state of the screen (categories, visible products, cart) and
//! turns cashier actions into backend calls. The cart on the backend is
//! authoritative: after every mutation the whole cart is read back instead of
//! being patched locally.
//!
//! The state lock is never held across a backend call. Product and cart
//! reads each take a token from a monotonic sequence before they start, and
//! a response is only applied if no newer read of the same kind has begun,
//! so a slow answer to an old category switch cannot overwrite a newer one.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use kasir_core::cart::find_by_product;
use kasir_core::{
    CartItem, CartItemId, CartSummary, Category, CategoryId, CustomerName, CustomerNameError,
    NewCartItem, Order, OrderError, Product, ProductId,
};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::api::{ApiError, ClearOutcome, KasirApi};

/// Name shown for a product whose category is not loaded.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Errors from cashier actions.
#[derive(Debug, Error)]
pub enum PageError {
    /// A backend call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Keranjang kosong! Silakan tambahkan produk ke keranjang terlebih dahulu.")]
    EmptyCart,

    #[error("Nama pelanggan diperlukan! Silakan masukkan nama pelanggan.")]
    MissingCustomerName,

    #[error("Nama pelanggan tidak valid: {0}")]
    InvalidCustomerName(CustomerNameError),

    #[error("Item keranjang {0} tidak ditemukan.")]
    ItemNotFound(CartItemId),

    #[error("Produk {0} tidak ditemukan.")]
    ProductNotFound(ProductId),

    /// Checkout went through but some cart records survived the clear.
    #[error("Gagal memproses checkout: {remaining} item masih ada di keranjang.")]
    CartNotCleared { remaining: usize },
}

impl PageError {
    /// Whether the action was rejected before any backend call.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyCart | Self::MissingCustomerName | Self::InvalidCustomerName(_)
        )
    }
}

impl From<CustomerNameError> for PageError {
    fn from(err: CustomerNameError) -> Self {
        match err {
            CustomerNameError::Blank => Self::MissingCustomerName,
            other @ CustomerNameError::TooLong { .. } => Self::InvalidCustomerName(other),
        }
    }
}

impl From<OrderError> for PageError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::EmptyCart => Self::EmptyCart,
        }
    }
}

/// Lifecycle of the screen's data.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    /// Nothing has been loaded yet.
    #[default]
    Loading,
    Ready,
    /// The last full load failed with this message.
    Error(String),
}

/// Everything the cashier screen renders.
#[derive(Debug, Clone, Default)]
pub struct PageState {
    pub phase: Phase,
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
    pub cart: Vec<CartItem>,
    pub selected_category: Option<CategoryId>,
}

impl PageState {
    /// Totals over the cart.
    #[must_use]
    pub fn summary(&self) -> CartSummary {
        CartSummary::of(&self.cart)
    }

    /// Display name of a category, or [`UNKNOWN_CATEGORY`].
    #[must_use]
    pub fn category_name(&self, id: &CategoryId) -> &str {
        self.categories
            .iter()
            .find(|c| c.id == *id)
            .map_or(UNKNOWN_CATEGORY, |c| c.name.as_str())
    }
}

/// Outcome of a quantity change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    Updated(u32),
    /// The requested quantity was below 1, so the record was deleted.
    Removed,
}

/// Checkout form contents.
#[derive(Debug, Clone, Default)]
pub struct CheckoutRequest {
    pub customer_name: String,
    pub note: Option<String>,
    pub item_notes: HashMap<CartItemId, String>,
}

/// Cart records the screen can show. Records stored with a quantity below 1
/// by another client are logged and left out.
fn sellable(cart: Vec<CartItem>) -> Vec<CartItem> {
    let (valid, invalid): (Vec<_>, Vec<_>) = cart.into_iter().partition(CartItem::is_valid);
    for item in &invalid {
        warn!(id = %item.id, name = %item.name, "Ignoring cart record without a quantity");
    }
    valid
}

/// Monotonic request tokens; only the newest token is current.
#[derive(Debug, Default)]
struct RequestSequence(AtomicU64);

impl RequestSequence {
    fn begin(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_latest(&self, token: u64) -> bool {
        self.0.load(Ordering::SeqCst) == token
    }
}

/// Controller behind the cashier screen.
pub struct KasirPage {
    api: KasirApi,
    state: RwLock<PageState>,
    product_reads: RequestSequence,
    cart_reads: RequestSequence,
}

impl KasirPage {
    #[must_use]
    pub fn new(api: KasirApi) -> Self {
        Self {
            api,
            state: RwLock::new(PageState::default()),
            product_reads: RequestSequence::default(),
            cart_reads: RequestSequence::default(),
        }
    }

    /// Copy of the current screen state.
    pub async fn snapshot(&self) -> PageState {
        self.state.read().await.clone()
    }

    /// Whether the screen has never loaded successfully or failed.
    pub async fn needs_load(&self) -> bool {
        self.state.read().await.phase == Phase::Loading
    }

    /// Load categories, cart and the products of the selected category.
    ///
    /// # Errors
    ///
    /// Returns the first backend error; the phase is then
    /// [`Phase::Error`] and the previous data is kept.
    #[instrument(skip(self))]
    pub async fn load_initial(&self) -> Result<(), PageError> {
        let product_token = self.product_reads.begin();
        let cart_token = self.cart_reads.begin();
        let selected = {
            let mut state = self.state.write().await;
            state.phase = Phase::Loading;
            state.selected_category.clone()
        };

        let result = tokio::try_join!(
            self.api.get_categories(),
            self.api.get_cart(),
            self.fetch_products(selected.as_ref()),
        );

        let mut state = self.state.write().await;
        match result {
            Ok((categories, cart, products)) => {
                state.categories = categories;
                if self.cart_reads.is_latest(cart_token) {
                    state.cart = sellable(cart);
                }
                if self.product_reads.is_latest(product_token) {
                    state.products = products;
                }
                state.phase = Phase::Ready;
                info!(
                    categories = state.categories.len(),
                    products = state.products.len(),
                    cart_items = state.cart.len(),
                    "Cashier screen loaded"
                );
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "Failed to load cashier screen");
                state.phase = Phase::Error(err.to_string());
                Err(err.into())
            }
        }
    }

    /// Switch the product list to `category` (`None` = all products).
    ///
    /// Returns `false` if a newer switch started while this one was in
    /// flight, in which case its result was discarded.
    ///
    /// # Errors
    ///
    /// Returns the backend error if the product list could not be read.
    #[instrument(skip(self))]
    pub async fn select_category(&self, category: Option<CategoryId>) -> Result<bool, PageError> {
        let token = self.product_reads.begin();
        let result = self.fetch_products(category.as_ref()).await;

        let mut state = self.state.write().await;
        if !self.product_reads.is_latest(token) {
            debug!(token, "Discarding stale product list");
            return Ok(false);
        }
        state.selected_category = category;
        state.products = result?;
        Ok(true)
    }

    /// Add one unit of a visible product to the cart.
    ///
    /// Increments the existing record for that product if there is one,
    /// otherwise creates a record with quantity 1.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::ProductNotFound`] if the product is not in the
    /// current list, or the backend error.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_product(&self, product_id: ProductId) -> Result<Product, PageError> {
        let (product, existing) = {
            let state = self.state.read().await;
            let product = state
                .products
                .iter()
                .find(|p| p.id == product_id)
                .cloned()
                .ok_or_else(|| PageError::ProductNotFound(product_id.clone()))?;
            (product, find_by_product(&state.cart, &product_id).cloned())
        };

        match existing {
            Some(item) => {
                let updated = item.with_quantity(item.quantity.saturating_add(1));
                self.api.update_cart_item(&item.id, &updated).await?;
            }
            None => {
                self.api
                    .add_to_cart(&NewCartItem::from_product(&product))
                    .await?;
            }
        }

        self.refresh_cart().await?;
        Ok(product)
    }

    /// Set the quantity of a cart record; below 1 deletes it.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::ItemNotFound`] if the record is not in the
    /// current cart, or the backend error.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn change_quantity(
        &self,
        id: CartItemId,
        requested: i64,
    ) -> Result<QuantityChange, PageError> {
        if requested < 1 {
            self.remove_item(id).await?;
            return Ok(QuantityChange::Removed);
        }

        let item = self
            .state
            .read()
            .await
            .cart
            .iter()
            .find(|item| item.id == id)
            .cloned()
            .ok_or_else(|| PageError::ItemNotFound(id.clone()))?;

        let quantity = u32::try_from(requested).unwrap_or(u32::MAX);
        self.api
            .update_cart_item(&id, &item.with_quantity(quantity))
            .await?;
        self.refresh_cart().await?;
        Ok(QuantityChange::Updated(quantity))
    }

    /// Delete one cart record.
    ///
    /// # Errors
    ///
    /// Returns the backend error.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn remove_item(&self, id: CartItemId) -> Result<(), PageError> {
        self.api.remove_from_cart(&id).await?;
        self.refresh_cart().await
    }

    /// Delete every cart record and adopt whatever the backend still holds.
    ///
    /// # Errors
    ///
    /// Returns the backend error if the cart could not be read.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self) -> Result<ClearOutcome, PageError> {
        let token = self.cart_reads.begin();
        let outcome = self.api.clear_cart().await?;
        self.apply_cart(token, outcome.remaining.clone()).await;
        Ok(outcome)
    }

    /// Check out the current cart.
    ///
    /// Validation happens before any backend call. The order itself is not
    /// sent anywhere; checking out empties the backend cart.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty cart or blank customer name,
    /// the backend error if clearing fails, or
    /// [`PageError::CartNotCleared`] if records survived the clear.
    #[instrument(skip(self, request))]
    pub async fn checkout(&self, request: CheckoutRequest) -> Result<Order, PageError> {
        let items = self.state.read().await.cart.clone();
        if items.is_empty() {
            return Err(PageError::EmptyCart);
        }

        let customer_name = CustomerName::parse(&request.customer_name)?;
        let order = Order::build(
            customer_name,
            request.note.as_deref(),
            &items,
            &request.item_notes,
            Utc::now(),
        )?;

        let outcome = self.clear_cart().await?;
        if !outcome.is_complete() {
            return Err(PageError::CartNotCleared {
                remaining: outcome.remaining.len(),
            });
        }

        info!(
            reference = %order.reference,
            customer = %order.customer_name,
            total_items = order.total_items,
            total_price = %order.total_price,
            "Order checked out"
        );
        Ok(order)
    }

    async fn fetch_products(
        &self,
        category: Option<&CategoryId>,
    ) -> Result<Vec<Product>, ApiError> {
        match category {
            Some(id) => self.api.get_products_by_category(id).await,
            None => self.api.get_products().await,
        }
    }

    async fn refresh_cart(&self) -> Result<(), PageError> {
        let token = self.cart_reads.begin();
        let cart = self.api.get_cart().await?;
        self.apply_cart(token, cart).await;
        Ok(())
    }

    async fn apply_cart(&self, token: u64, cart: Vec<CartItem>) {
        let mut state = self.state.write().await;
        if self.cart_reads.is_latest(token) {
            state.cart = sellable(cart);
        } else {
            debug!(token, "Discarding stale cart");
        }
    }
}
