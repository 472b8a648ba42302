//! Shared transport and per-session request execution.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use moka::future::Cache;
use reqwest::{Method, StatusCode, header};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, instrument, warn};

use crate::auth::{self, TokenPair};
use crate::catalog::CacheEntry;
use crate::error::ApiError;
use crate::retry;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
const CACHE_TTL: Duration = Duration::from_secs(300);
const CACHE_CAPACITY: u64 = 1_000;

/// Shared transport for the Shutterbay API.
///
/// Cheap to clone; holds the connection pool, the API base URL, and the
/// catalog response cache. Create one per process and derive
/// [`ApiSession`]s from it per incoming browser session.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    /// Base URL with no trailing slash, e.g. `https://api.shutterbay.example`.
    base_url: String,
    catalog_cache: Cache<String, CacheEntry>,
}

impl ApiClient {
    /// Create a client for the API at `base_url`.
    ///
    /// # Panics
    ///
    /// Panics if the underlying HTTP client cannot be constructed, which
    /// only happens if TLS initialization fails.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            inner: Arc::new(ClientInner {
                http,
                base_url: base_url.trim_end_matches('/').to_owned(),
                catalog_cache: Cache::builder()
                    .max_capacity(CACHE_CAPACITY)
                    .time_to_live(CACHE_TTL)
                    .build(),
            }),
        }
    }

    /// Derive a session carrying the given stored credentials.
    #[must_use]
    pub fn session(&self, tokens: Option<TokenPair>) -> ApiSession {
        ApiSession {
            client: self.clone(),
            auth: Arc::new(SessionAuth {
                tokens: RwLock::new(tokens),
                refresh_gate: Mutex::new(()),
                invalidated: AtomicBool::new(false),
            }),
        }
    }

    /// Derive a session with no credentials (guest browsing).
    #[must_use]
    pub fn anonymous(&self) -> ApiSession {
        self.session(None)
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    pub(crate) fn catalog_cache(&self) -> &Cache<String, CacheEntry> {
        &self.inner.catalog_cache
    }

    /// Drop all cached catalog responses. Called after admin product
    /// mutations so the storefront stops serving stale listings.
    pub fn invalidate_catalog_cache(&self) {
        self.inner.catalog_cache.invalidate_all();
    }
}

struct SessionAuth {
    tokens: RwLock<Option<TokenPair>>,
    /// Serializes credential refreshes so concurrent 401s coalesce into
    /// one upstream refresh call.
    refresh_gate: Mutex<()>,
    invalidated: AtomicBool,
}

/// A per-browser-session handle onto the API.
///
/// Clones share credential state, so concurrent requests from the same
/// session observe each other's refreshes.
#[derive(Clone)]
pub struct ApiSession {
    client: ApiClient,
    auth: Arc<SessionAuth>,
}

impl ApiSession {
    /// The shared transport this session was derived from.
    #[must_use]
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// The current credential pair, if signed in.
    pub async fn tokens(&self) -> Option<TokenPair> {
        self.auth.tokens.read().await.clone()
    }

    /// Whether the session carries credentials.
    pub async fn is_authenticated(&self) -> bool {
        self.auth.tokens.read().await.is_some()
    }

    /// Whether the session was invalidated by a failed credential refresh.
    ///
    /// Callers that observe this must clear their stored credentials and
    /// send the user to the login view.
    #[must_use]
    pub fn is_invalidated(&self) -> bool {
        self.auth.invalidated.load(Ordering::SeqCst)
    }

    /// Install a fresh credential pair, e.g. after login.
    pub(crate) async fn install_tokens(&self, tokens: TokenPair) {
        *self.auth.tokens.write().await = Some(tokens);
        self.auth.invalidated.store(false, Ordering::SeqCst);
    }

    /// Drop credentials without marking the session invalid (sign-out).
    pub(crate) async fn clear_tokens(&self) {
        *self.auth.tokens.write().await = None;
    }

    /// Drop credentials and mark the session invalid (forced sign-out).
    pub(crate) async fn invalidate(&self) {
        *self.auth.tokens.write().await = None;
        self.auth.invalidated.store(true, Ordering::SeqCst);
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(Method::GET, path, None).await
    }

    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T, ApiError> {
        self.execute(Method::POST, path, Some(body)).await
    }

    pub(crate) async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T, ApiError> {
        self.execute(Method::PUT, path, Some(body)).await
    }

    pub(crate) async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(Method::DELETE, path, None).await
    }

    /// Execute a request against the API.
    ///
    /// Attaches the bearer credential when present. On an unauthorized
    /// response the retry policy decides whether to refresh credentials
    /// and replay; the attempt counter guarantees at most one replay per
    /// logical request.
    #[instrument(skip(self, body))]
    pub(crate) async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T, ApiError> {
        let url = self.client.endpoint(path);
        let mut attempt = 0;

        loop {
            let access_token = self
                .auth
                .tokens
                .read()
                .await
                .as_ref()
                .map(|pair| pair.access_token.clone());

            let mut request = self.client.http().request(method.clone(), &url);
            if let Some(token) = &access_token {
                request = request.bearer_auth(token);
            }
            if let Some(body) = &body {
                request = request.json(body);
            }

            let response = request.send().await?;
            let status = response.status();

            if retry::should_refresh(status, attempt) && access_token.is_some() {
                debug!(attempt, "Unauthorized response, refreshing credentials");
                self.refresh_credentials(access_token.as_deref()).await?;
                attempt += 1;
                continue;
            }

            return parse_response(response).await;
        }
    }

    /// Refresh the access credential, coalescing concurrent callers.
    ///
    /// `stale_access` is the access token the caller just failed with. If
    /// the stored token already differs when the gate is acquired, another
    /// caller refreshed first and this one returns without a network call.
    async fn refresh_credentials(&self, stale_access: Option<&str>) -> Result<(), ApiError> {
        let _gate = self.auth.refresh_gate.lock().await;

        let refresh_token = {
            let tokens = self.auth.tokens.read().await;
            match tokens.as_ref() {
                Some(pair) => {
                    if stale_access.is_some_and(|stale| pair.access_token != stale) {
                        debug!("Credentials already refreshed by a concurrent request");
                        return Ok(());
                    }
                    pair.refresh_token.clone()
                }
                None => {
                    self.invalidate().await;
                    return Err(ApiError::SessionExpired);
                }
            }
        };

        match auth::refresh_access_token(&self.client, &refresh_token).await {
            Ok(new_access) => {
                let mut tokens = self.auth.tokens.write().await;
                if let Some(pair) = tokens.as_mut() {
                    pair.access_token = new_access;
                }
                debug!("Refreshed API credentials");
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "Credential refresh failed, invalidating session");
                self.invalidate().await;
                Err(ApiError::SessionExpired)
            }
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Map a response to a typed value or an [`ApiError`].
///
/// The body is read as text first so parse failures can be logged with
/// a truncated copy of what the server actually sent.
pub(crate) async fn parse_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ApiError> {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse().ok())
            .unwrap_or(60);
        return Err(ApiError::RateLimited(retry_after));
    }

    let text = response.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|body| body.message.or(body.error))
            .unwrap_or_else(|| truncate(&text, 200).to_owned());

        return Err(match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized(message),
            StatusCode::NOT_FOUND => ApiError::NotFound(message),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                ApiError::Validation(message)
            }
            _ => ApiError::Server {
                status: status.as_u16(),
                message,
            },
        });
    }

    serde_json::from_str(&text).map_err(|err| {
        error!(
            error = %err,
            body = truncate(&text, 500),
            "Failed to parse API response"
        );
        ApiError::Parse(err)
    })
}

fn truncate(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let client = ApiClient::new("https://api.example.com/");
        assert_eq!(
            client.endpoint("/products"),
            "https://api.example.com/products"
        );
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("hi", 10), "hi");
    }

    #[tokio::test]
    async fn test_anonymous_session_has_no_credentials() {
        let session = ApiClient::new("https://api.example.com").anonymous();
        assert!(!session.is_authenticated().await);
        assert!(!session.is_invalidated());
    }

    #[tokio::test]
    async fn test_invalidate_clears_credentials_and_flags() {
        let client = ApiClient::new("https://api.example.com");
        let session = client.session(Some(TokenPair {
            access_token: "access".to_owned(),
            refresh_token: "refresh".to_owned(),
        }));

        session.invalidate().await;
        assert!(!session.is_authenticated().await);
        assert!(session.is_invalidated());
    }

    #[tokio::test]
    async fn test_clones_share_credential_state() {
        let client = ApiClient::new("https://api.example.com");
        let session = client.anonymous();
        let clone = session.clone();

        session
            .install_tokens(TokenPair {
                access_token: "access".to_owned(),
                refresh_token: "refresh".to_owned(),
            })
            .await;

        assert!(clone.is_authenticated().await);
    }
}
