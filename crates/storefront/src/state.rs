//! Application state shared across handlers.

use std::sync::Arc;

use shutterbay_client::ApiClient;

use crate::config::StorefrontConfig;
use crate::services::{CartStore, SessionStore};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. The stores are constructed once here and
/// injected everywhere; handlers never reach for ambient state.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    api: ApiClient,
    sessions: SessionStore,
    carts: CartStore,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let api = ApiClient::new(&config.api_url);
        let sessions = SessionStore::new(api.clone());
        let carts = CartStore::new();

        Self {
            inner: Arc::new(AppStateInner {
                config,
                api,
                sessions,
                carts,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the shared API transport.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Get a reference to the credential storage service.
    #[must_use]
    pub fn sessions(&self) -> &SessionStore {
        &self.inner.sessions
    }

    /// Get a reference to the cart storage service.
    #[must_use]
    pub fn carts(&self) -> &CartStore {
        &self.inner.carts
    }
}
