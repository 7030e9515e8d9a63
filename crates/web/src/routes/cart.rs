//! Cart route handlers.
//!
//! Every handler answers with the cart panel fragment. Failures are shown as
//! a notice inside the panel so the screen stays usable.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, IntoResponse, Response},
};
use kasir_core::{CartItemId, ProductId};
use serde::Deserialize;
use tracing::instrument;

use crate::page::QuantityChange;
use crate::state::AppState;
use crate::views::{CartView, Notice, ReceiptView};

/// HTMX event fired after the cart changed.
pub const CART_UPDATED: &str = "cart-updated";

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
}

/// Update quantity form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub item_id: String,
    #[serde(default)]
    pub jumlah: String,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub item_id: String,
}

/// Cart panel fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart.html")]
pub struct CartTemplate {
    pub cart: CartView,
    pub notice: Option<Notice>,
    pub receipt: Option<ReceiptView>,
}

/// Render the current cart with an optional notice.
pub(crate) async fn cart_fragment(
    state: &AppState,
    notice: Option<Notice>,
    receipt: Option<ReceiptView>,
) -> Response {
    let snapshot = state.page().snapshot().await;
    (
        AppendHeaders([("HX-Trigger", CART_UPDATED)]),
        CartTemplate {
            cart: CartView::from_state(&snapshot),
            notice,
            receipt,
        },
    )
        .into_response()
}

/// Quantity typed by the cashier; anything that is not a number counts as 1.
fn parse_quantity(raw: &str) -> i64 {
    raw.trim().parse().unwrap_or(1)
}

/// Add one unit of a product (HTMX).
#[instrument(skip(state))]
pub async fn add(State(state): State<AppState>, Form(form): Form<AddToCartForm>) -> Response {
    let Ok(product_id) = form.product_id.parse::<ProductId>() else {
        let notice = Notice::error(format!("Produk tidak valid: {}", form.product_id));
        return cart_fragment(&state, Some(notice), None).await;
    };

    let notice = match state.page().add_product(product_id).await {
        Ok(product) => Notice::success(
            "Berhasil!",
            format!("{} ditambahkan ke keranjang", product.name),
        ),
        Err(e) => Notice::error(e.to_string()),
    };

    cart_fragment(&state, Some(notice), None).await
}

/// Set the quantity of a cart item (HTMX).
#[instrument(skip(state))]
pub async fn update(State(state): State<AppState>, Form(form): Form<UpdateCartForm>) -> Response {
    let Ok(id) = form.item_id.parse::<CartItemId>() else {
        let notice = Notice::error(format!("Item tidak valid: {}", form.item_id));
        return cart_fragment(&state, Some(notice), None).await;
    };

    let notice = match state
        .page()
        .change_quantity(id, parse_quantity(&form.jumlah))
        .await
    {
        Ok(QuantityChange::Updated(_)) => None,
        Ok(QuantityChange::Removed) => Some(Notice::success("Berhasil!", "Item berhasil dihapus!")),
        Err(e) => Some(Notice::error(e.to_string())),
    };

    cart_fragment(&state, notice, None).await
}

/// Remove a cart item (HTMX).
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    Form(form): Form<RemoveFromCartForm>,
) -> Response {
    let Ok(id) = form.item_id.parse::<CartItemId>() else {
        let notice = Notice::error(format!("Item tidak valid: {}", form.item_id));
        return cart_fragment(&state, Some(notice), None).await;
    };

    let notice = match state.page().remove_item(id).await {
        Ok(()) => Notice::success("Berhasil!", "Item berhasil dihapus!"),
        Err(e) => Notice::error(e.to_string()),
    };

    cart_fragment(&state, Some(notice), None).await
}

/// Remove every cart item (HTMX).
#[instrument(skip(state))]
pub async fn clear(State(state): State<AppState>) -> Response {
    let notice = match state.page().clear_cart().await {
        Ok(outcome) if outcome.is_complete() => {
            Notice::success("Berhasil!", "Keranjang berhasil dikosongkan!")
        }
        Ok(outcome) => Notice::warning(
            "Sebagian Gagal",
            format!(
                "{} dari {} item dihapus, {} item masih ada di keranjang.",
                outcome.deleted(),
                outcome.requested,
                outcome.remaining.len()
            ),
        ),
        Err(e) => Notice::error(e.to_string()),
    };

    cart_fragment(&state, Some(notice), None).await
}
