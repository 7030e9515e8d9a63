//! Cart inspection and cleanup.

use kasir_core::CartSummary;
use kasir_web::api::KasirApi;
use kasir_web::config::ApiConfig;
use tracing::{info, warn};

/// Log every cart record and the cart totals.
///
/// # Errors
///
/// Returns an error if the backend is unreachable or the cart cannot be read.
pub async fn show(config: &ApiConfig) -> Result<(), Box<dyn std::error::Error>> {
    let api = KasirApi::new(config)?;
    let items = api.get_cart().await?;

    if items.is_empty() {
        info!("Cart is empty");
        return Ok(());
    }

    for item in &items {
        info!(
            id = %item.id,
            name = %item.name,
            quantity = item.quantity,
            price = %item.price,
            line_total = %item.line_total(),
            note = item.note.as_deref().unwrap_or(""),
            "Cart item"
        );
    }

    let summary = CartSummary::of(&items);
    info!(
        total_items = summary.total_items,
        total_price = %summary.total_price,
        "Cart total"
    );
    Ok(())
}

/// Delete every cart record.
///
/// # Errors
///
/// Returns an error if the backend is unreachable or records remain after
/// the clear.
pub async fn clear(config: &ApiConfig) -> Result<(), Box<dyn std::error::Error>> {
    let api = KasirApi::new(config)?;
    let outcome = api.clear_cart().await?;

    for failure in &outcome.failures {
        warn!(id = %failure.id, error = %failure.error, "Delete failed");
    }

    if !outcome.is_complete() {
        return Err(format!(
            "{} of {} records deleted, {} remain",
            outcome.deleted(),
            outcome.requested,
            outcome.remaining.len()
        )
        .into());
    }

    info!(deleted = outcome.deleted(), "Cart cleared");
    Ok(())
}
