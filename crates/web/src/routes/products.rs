//! Catalog route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use kasir_core::CategoryId;
use serde::Deserialize;
use tracing::instrument;

use crate::state::AppState;
use crate::views::{CatalogView, Notice};

/// Category filter query. An absent or empty `kategori` means all products.
#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub kategori: Option<String>,
}

/// Catalog fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/catalog.html")]
pub struct CatalogTemplate {
    pub catalog: CatalogView,
    pub notice: Option<Notice>,
}

/// Switch the product grid to a category (HTMX).
///
/// Answers 204 when a newer switch overtook this one, so the newer grid is
/// not replaced.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>, Query(query): Query<CategoryQuery>) -> Response {
    let page = state.page();

    let category = query
        .kategori
        .as_deref()
        .and_then(|raw| raw.parse::<CategoryId>().ok());

    let notice = match page.select_category(category).await {
        Ok(true) => None,
        Ok(false) => return StatusCode::NO_CONTENT.into_response(),
        Err(e) => Some(Notice::error(e.to_string())),
    };

    let snapshot = page.snapshot().await;
    CatalogTemplate {
        catalog: CatalogView::from_state(&snapshot),
        notice,
    }
    .into_response()
}
