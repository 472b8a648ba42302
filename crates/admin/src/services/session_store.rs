//! Credential storage service for admin sessions.
//!
//! Same contract as the storefront's: the credential pair and the stored
//! identity are one unit, written together at login and cleared together
//! when the API invalidates the session.

use serde::de::DeserializeOwned;
use shutterbay_client::{ApiClient, ApiSession, TokenPair};
use tower_sessions::Session;
use tracing::{debug, instrument, warn};

use crate::error::Result;
use crate::models::{CurrentAdmin, session_keys};

/// Service owning credential persistence for admin sessions.
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

    /// Build an API session from the credentials stored in the session.
    pub async fn api_session(&self, session: &Session) -> ApiSession {
        let tokens = self
            .read_or_clear::<TokenPair>(session, session_keys::AUTH_TOKENS)
            .await;
        self.api.session(tokens)
    }

    /// Persist credential changes back to the session.
    ///
    /// A refreshed access token is written back; an invalidated session
    /// clears the stored credentials and admin together.
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

    /// Store a fresh credential pair and admin identity after login.
    pub async fn establish(
        &self,
        session: &Session,
        tokens: TokenPair,
        admin: &CurrentAdmin,
    ) -> Result<()> {
        session.insert(session_keys::AUTH_TOKENS, &tokens).await?;
        session.insert(session_keys::CURRENT_ADMIN, admin).await?;
        Ok(())
    }

    /// The stored admin, if anyone is signed in.
    pub async fn current_admin(&self, session: &Session) -> Option<CurrentAdmin> {
        self.read_or_clear(session, session_keys::CURRENT_ADMIN)
            .await
    }

    /// Drop the stored credential pair and admin identity.
    ///
    /// Removal goes through `serde_json::Value` so a corrupt stored value
    /// still comes out.
    pub async fn clear(&self, session: &Session) -> Result<()> {
        session
            .remove::<serde_json::Value>(session_keys::AUTH_TOKENS)
            .await?;
        session
            .remove::<serde_json::Value>(session_keys::CURRENT_ADMIN)
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

    #[tokio::test]
    async fn test_unreadable_admin_record_is_removed_with_credentials() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        let store = SessionStore::new(ApiClient::new("http://127.0.0.1:9"));
        session
            .insert(session_keys::CURRENT_ADMIN, vec![1, 2, 3])
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

        assert!(store.current_admin(&session).await.is_none());
        assert!(
            session
                .get::<serde_json::Value>(session_keys::AUTH_TOKENS)
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            session
                .get::<serde_json::Value>(session_keys::CURRENT_ADMIN)
                .await
                .unwrap()
                .is_none()
        );
    }
}
