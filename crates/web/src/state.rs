//! Application state shared across handlers.

use std::sync::Arc;

use crate::api::{ApiError, KasirApi};
use crate::config::KasirConfig;
use crate::page::KasirPage;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. There is one cashier screen per process, so
/// the page controller lives here rather than in a session.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: KasirConfig,
    api: KasirApi,
    page: KasirPage,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: KasirConfig) -> Result<Self, ApiError> {
        let api = KasirApi::new(&config.api)?;
        let page = KasirPage::new(api.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner { config, api, page }),
        })
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &KasirConfig {
        &self.inner.config
    }

    /// Get a reference to the backend client.
    #[must_use]
    pub fn api(&self) -> &KasirApi {
        &self.inner.api
    }

    /// Get a reference to the cashier screen controller.
    #[must_use]
    pub fn page(&self) -> &KasirPage {
        &self.inner.page
    }
}
