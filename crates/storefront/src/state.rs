//! Application state shared across handlers.

use std::sync::Arc;

use crate::backend::{BackendClient, BackendError, CategoryCache};
use crate::config::StorefrontConfig;
use crate::services::CheckoutOrchestrator;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Carts are not here: they live in each
/// visitor's session.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    backend: BackendClient,
    checkout: CheckoutOrchestrator,
    categories: CategoryCache,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend client cannot be built from the
    /// commerce configuration.
    pub fn new(config: StorefrontConfig) -> Result<Self, BackendError> {
        let backend = BackendClient::new(&config.commerce)?;
        let checkout = CheckoutOrchestrator::new(&config.commerce, backend.clone());
        let categories = CategoryCache::new(backend.clone(), config.category_cache_ttl);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                checkout,
                categories,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the commerce backend client.
    #[must_use]
    pub fn backend(&self) -> &BackendClient {
        &self.inner.backend
    }

    /// Get a reference to the checkout orchestrator.
    #[must_use]
    pub fn checkout(&self) -> &CheckoutOrchestrator {
        &self.inner.checkout
    }

    /// Get a reference to the category tree cache.
    #[must_use]
    pub fn categories(&self) -> &CategoryCache {
        &self.inner.categories
    }
}
