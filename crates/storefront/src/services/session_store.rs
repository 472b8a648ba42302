//! Credential storage service.
//!
//! Bridges the browser session (tower-sessions) and the API client. The
//! credential pair and the current user are one unit: written together at
//! login, cleared together when the API invalidates the session. Handlers
//! never touch the session keys directly; they go through this service so
//! the pairing cannot drift.

use serde::de::DeserializeOwned;
use shutterbay_client::{ApiClient, ApiSession, TokenPair};
use tower_sessions::Session;
use tracing::{debug, instrument, warn};

use crate::error::Result;
use crate::models::{CurrentUser, session_keys};

/// Service owning credential persistence for browser sessions.
#[derive(Clone)]
pub struct SessionStore {
    api: ApiClient,
}

impl SessionStore {
    /// Create a store that derives API sessions from `api`.
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Build an API session from the credentials stored in the browser session.
    ///
    /// Guests get an anonymous session.
    pub async fn api_session(&self, session: &Session) -> ApiSession {
        let tokens = self
            .read_or_clear::<TokenPair>(session, session_keys::AUTH_TOKENS)
            .await;
        self.api.session(tokens)
    }

    /// Persist credential changes back to the browser session.
    ///
    /// Call after API work on a derived session: a refreshed access token
    /// is written back, and an invalidated session clears the stored
    /// credentials and user together.
    #[instrument(skip_all)]
    pub async fn sync(&self, session: &Session, api: &ApiSession) -> Result<()> {
        if api.is_invalidated() {
            debug!("API session invalidated, clearing stored credentials");
            self.clear(session).await?;
            return Ok(());
        }

        if let Some(tokens) = api.tokens().await {
            session.insert(session_keys::AUTH_TOKENS, &tokens).await?;
        }
        Ok(())
    }

    /// Store a fresh credential pair and user after login.
    pub async fn establish(
        &self,
        session: &Session,
        tokens: TokenPair,
        user: &CurrentUser,
    ) -> Result<()> {
        session.insert(session_keys::AUTH_TOKENS, &tokens).await?;
        session.insert(session_keys::CURRENT_USER, user).await?;
        Ok(())
    }

    /// The stored user, if anyone is signed in.
    pub async fn current_user(&self, session: &Session) -> Option<CurrentUser> {
        self.read_or_clear(session, session_keys::CURRENT_USER)
            .await
    }

    /// Drop the stored credential pair and user.
    ///
    /// Removal goes through `serde_json::Value` so a corrupt stored value
    /// still comes out.
    pub async fn clear(&self, session: &Session) -> Result<()> {
        session
            .remove::<serde_json::Value>(session_keys::AUTH_TOKENS)
            .await?;
        session
            .remove::<serde_json::Value>(session_keys::CURRENT_USER)
            .await?;
        Ok(())
    }

    /// Read a stored value; an unparseable one is discarded together with
    /// the rest of the auth state rather than left to fail on every request.
    async fn read_or_clear<T>(&self, session: &Session, key: &str) -> Option<T>
    where
        T: DeserializeOwned,
    {
        match session.get::<T>(key).await {
            Ok(value) => value,
            Err(err) => {
                warn!(key, error = %err, "Stored session value unreadable, clearing auth state");
                if let Err(err) = self.clear(session).await {
                    warn!(error = %err, "Failed to clear unreadable session state");
                }
                None
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::{MemoryStore, Session};

    use super::*;

    fn store() -> SessionStore {
        SessionStore::new(ApiClient::new("http://127.0.0.1:9"))
    }

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_unreadable_credentials_are_removed() {
        let session = session();
        session.insert(session_keys::AUTH_TOKENS, 42).await.unwrap();

        let api = store().api_session(&session).await;
        assert!(!api.is_authenticated().await);
        assert!(
            session
                .get::<serde_json::Value>(session_keys::AUTH_TOKENS)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_unreadable_user_clears_credentials_too() {
        let session = session();
        let store = store();
        session
            .insert(session_keys::CURRENT_USER, "not a user record")
            .await
            .unwrap();
        session
            .insert(
                session_keys::AUTH_TOKENS,
                TokenPair {
                    access_token: "access".to_owned(),
                    refresh_token: "refresh".to_owned(),
                },
            )
            .await
            .unwrap();

        assert!(store.current_user(&session).await.is_none());
        assert!(
            session
                .get::<serde_json::Value>(session_keys::AUTH_TOKENS)
                .await
                .unwrap()
                .is_none()
        );
    }
}
