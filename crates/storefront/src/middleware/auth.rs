//! Authentication middleware and extractors.
//!
//! Provides extractors for requiring a signed-in customer in route handlers.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentUser, session_keys};

/// Read the stored user; a record that no longer parses is removed along
/// with the credential pair rather than left to fail on every request.
async fn stored_user(session: &Session) -> Option<CurrentUser> {
    match session.get::<CurrentUser>(session_keys::CURRENT_USER).await {
        Ok(user) => user,
        Err(err) => {
            tracing::warn!(error = %err, "Stored user unreadable, clearing auth state");
            for key in [session_keys::AUTH_TOKENS, session_keys::CURRENT_USER] {
                if let Err(err) = session.remove::<serde_json::Value>(key).await {
                    tracing::warn!(key, error = %err, "Failed to drop unreadable session value");
                }
            }
            None
        }
    }
}

/// Extractor that requires a signed-in customer.
///
/// If nobody is logged in, returns a redirect to the login page.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.name)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Error returned when authentication is required but nobody is logged in.
pub enum AuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for fragment requests).
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Session is inserted into extensions by SessionManagerLayer
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::Unauthorized)?;

        let user = stored_user(session)
            .await
            .ok_or(AuthRejection::RedirectToLogin)?;

        Ok(Self(user))
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this does not reject the request if nobody is
/// logged in.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => stored_user(session).await,
            None => None,
        };

        Ok(Self(user))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    #[tokio::test]
    async fn test_unreadable_stored_user_is_cleared_and_rejected() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        session
            .insert(session_keys::CURRENT_USER, 7)
            .await
            .unwrap();
        session
            .insert(session_keys::AUTH_TOKENS, "stale")
            .await
            .unwrap();

        let (mut parts, ()) = axum::http::Request::builder()
            .uri("/account")
            .body(())
            .unwrap()
            .into_parts();
        parts.extensions.insert(session.clone());

        assert!(
            RequireAuth::from_request_parts(&mut parts, &())
                .await
                .is_err()
        );
        assert!(
            session
                .get::<serde_json::Value>(session_keys::CURRENT_USER)
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            session
                .get::<serde_json::Value>(session_keys::AUTH_TOKENS)
                .await
                .unwrap()
                .is_none()
        );
    }
}
