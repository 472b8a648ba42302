//! Admin authentication extractor.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentAdmin, session_keys};

/// Extractor that requires a signed-in admin.
///
/// The role was checked at login; this extractor only checks that an
/// admin identity is present in the session. If none is, the request
/// is redirected to the sign-in page.
pub struct RequireAdmin(pub CurrentAdmin);

/// Rejection for requests without an admin session.
pub enum AuthRejection {
    /// Redirect to the sign-in page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (when the session layer is missing).
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

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::Unauthorized)?;

        let admin = match session
            .get::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
            .await
        {
            Ok(admin) => admin,
            Err(err) => {
                tracing::warn!(error = %err, "Stored admin unreadable, clearing auth state");
                for key in [session_keys::AUTH_TOKENS, session_keys::CURRENT_ADMIN] {
                    if let Err(err) = session.remove::<serde_json::Value>(key).await {
                        tracing::warn!(key, error = %err, "Failed to drop unreadable session value");
                    }
                }
                None
            }
        };

        Ok(Self(admin.ok_or(AuthRejection::RedirectToLogin)?))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    #[tokio::test]
    async fn test_unreadable_stored_admin_is_cleared_and_rejected() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        session
            .insert(session_keys::CURRENT_ADMIN, false)
            .await
            .unwrap();

        let (mut parts, ()) = axum::http::Request::builder()
            .uri("/")
            .body(())
            .unwrap()
            .into_parts();
        parts.extensions.insert(session.clone());

        assert!(
            RequireAdmin::from_request_parts(&mut parts, &())
                .await
                .is_err()
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
