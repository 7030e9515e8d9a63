//! Checkout route handler.

use std::collections::HashMap;

use axum::{Form, extract::State, response::Response};
use kasir_core::CartItemId;
use tracing::instrument;

use crate::page::{CheckoutRequest, PageError};
use crate::state::AppState;
use crate::views::{Notice, ReceiptView};

use super::cart::cart_fragment;

/// Prefix of the per-item note fields, followed by the cart item id.
const ITEM_NOTE_PREFIX: &str = "note_";

/// Read the checkout form: `customer_name`, `note` and one `note_{id}` per
/// cart item. Note fields without an item id are ignored.
fn checkout_request(mut form: HashMap<String, String>) -> CheckoutRequest {
    let customer_name = form.remove("customer_name").unwrap_or_default();
    let note = form.remove("note");

    let item_notes = form
        .into_iter()
        .filter_map(|(key, value)| {
            let id = key.strip_prefix(ITEM_NOTE_PREFIX)?.parse::<CartItemId>().ok()?;
            Some((id, value))
        })
        .collect();

    CheckoutRequest {
        customer_name,
        note,
        item_notes,
    }
}

/// Notice for a failed checkout.
fn failure_notice(err: &PageError) -> Notice {
    match err {
        PageError::EmptyCart => Notice::warning(
            "Keranjang Kosong!",
            "Silakan tambahkan produk ke keranjang terlebih dahulu.",
        ),
        PageError::MissingCustomerName => Notice::warning(
            "Nama Pelanggan Diperlukan!",
            "Silakan masukkan nama pelanggan.",
        ),
        PageError::InvalidCustomerName(_) => {
            Notice::warning("Nama Pelanggan Tidak Valid!", err.to_string())
        }
        _ => Notice::error(err.to_string()),
    }
}

/// Check out the cart (HTMX).
///
/// Answers with the cart panel, carrying the receipt on success.
#[instrument(skip(state, form))]
pub async fn checkout(
    State(state): State<AppState>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    match state.page().checkout(checkout_request(form)).await {
        Ok(order) => {
            let notice = Notice::success(
                "Checkout Berhasil!",
                format!("Pesanan atas nama {} telah diproses.", order.customer_name),
            );
            cart_fragment(&state, Some(notice), Some(ReceiptView::from(&order))).await
        }
        Err(e) => cart_fragment(&state, Some(failure_notice(&e)), None).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_checkout_request_fields() {
        let request = checkout_request(form(&[
            ("customer_name", "Budi"),
            ("note", "bungkus"),
            ("note_4", "pedas"),
            ("note_9f3a", "tanpa es"),
            ("note_", "ignored"),
            ("other", "ignored"),
        ]));

        assert_eq!(request.customer_name, "Budi");
        assert_eq!(request.note.as_deref(), Some("bungkus"));
        assert_eq!(request.item_notes.len(), 2);
        assert_eq!(
            request.item_notes.get(&CartItemId::new(4)).map(String::as_str),
            Some("pedas")
        );
        assert_eq!(
            request.item_notes.get(&CartItemId::new("9f3a")).map(String::as_str),
            Some("tanpa es")
        );
    }

    #[test]
    fn test_missing_name_is_blank() {
        let request = checkout_request(HashMap::new());
        assert!(request.customer_name.is_empty());
        assert!(request.note.is_none());
    }

    #[test]
    fn test_failure_notice_titles() {
        assert_eq!(failure_notice(&PageError::EmptyCart).title, "Keranjang Kosong!");
        assert_eq!(
            failure_notice(&PageError::MissingCustomerName).title,
            "Nama Pelanggan Diperlukan!"
        );
        assert_eq!(
            failure_notice(&PageError::CartNotCleared { remaining: 1 }).title,
            "Error"
        );
    }
}
