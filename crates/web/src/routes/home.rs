//! Cashier screen route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::Redirect};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::page::Phase;
use crate::state::AppState;
use crate::views::{CartView, CatalogView, Notice, ReceiptView};

/// Full cashier screen.
///
/// Shares its field names with the catalog and cart fragments it includes.
#[derive(Template, WebTemplate)]
#[template(path = "kasir.html")]
pub struct KasirTemplate {
    pub catalog: CatalogView,
    pub cart: CartView,
    pub notice: Option<Notice>,
    pub receipt: Option<ReceiptView>,
}

/// Display the cashier screen.
///
/// The first visit loads everything from the backend. A failed load is shown
/// as the error screen (502) and stays on it (503) until the cashier retries.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> Result<KasirTemplate> {
    let page = state.page();
    if page.needs_load().await {
        page.load_initial().await?;
    }

    let snapshot = page.snapshot().await;
    if let Phase::Error(message) = snapshot.phase {
        return Err(AppError::Unavailable(message));
    }

    Ok(KasirTemplate {
        catalog: CatalogView::from_state(&snapshot),
        cart: CartView::from_state(&snapshot),
        notice: None,
        receipt: None,
    })
}

/// Reload everything, then show the cashier screen again.
#[instrument(skip(state))]
pub async fn retry(State(state): State<AppState>) -> Redirect {
    if let Err(e) = state.page().load_initial().await {
        tracing::warn!(error = %e, "Retry failed");
    }
    Redirect::to("/")
}
