//! Application state shared across handlers.

use std::sync::Arc;

use secrecy::ExposeSecret;
use shutterbay_client::{ApiClient, ImageHost};

use crate::config::AdminConfig;
use crate::services::SessionStore;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Stores are constructed once here and
/// injected everywhere; handlers never reach for ambient state.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    api: ApiClient,
    sessions: SessionStore,
    images: ImageHost,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: AdminConfig) -> Self {
        let api = ApiClient::new(&config.api_url);
        let sessions = SessionStore::new(api.clone());
        let images = ImageHost::new(
            reqwest::Client::new(),
            &config.image_host_endpoint,
            config.image_host_api_key.expose_secret(),
        );

        Self {
            inner: Arc::new(AppStateInner {
                config,
                api,
                sessions,
                images,
            }),
        }
    }

    /// Get a reference to the console configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
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

    /// Get a reference to the image hosting client.
    #[must_use]
    pub fn images(&self) -> &ImageHost {
        &self.inner.images
    }
}
