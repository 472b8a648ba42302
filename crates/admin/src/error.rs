//! Unified error handling with Sentry integration.
//!
//! Mirrors the storefront's `AppError`, with the login redirect pointed at
//! the console's own sign-in page.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use shutterbay_client::ApiError;
use thiserror::Error;

/// Application-level error type for the admin console.
#[derive(Debug, Error)]
pub enum AppError {
    /// Shutterbay API operation failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Session read/write failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller is not an authenticated admin.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Dead credentials send the operator back to sign-in.
        if matches!(self, Self::Api(ApiError::SessionExpired)) {
            return Redirect::to("/login?error=session_expired").into_response();
        }

        // Capture server-side failures to Sentry
        if matches!(
            self,
            Self::Internal(_)
                | Self::Session(_)
                | Self::Api(ApiError::Http(_) | ApiError::Parse(_) | ApiError::Server { .. })
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Api(err) => match err {
                ApiError::Auth(_) | ApiError::Unauthorized(_) | ApiError::SessionExpired => {
                    StatusCode::UNAUTHORIZED
                }
                ApiError::NotFound(_) => StatusCode::NOT_FOUND,
                ApiError::Validation(_) => StatusCode::BAD_REQUEST,
                ApiError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
                ApiError::Http(_) | ApiError::Server { .. } | ApiError::Parse(_) => {
                    StatusCode::BAD_GATEWAY
                }
            },
            Self::Session(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Session(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Api(err) => match err {
                ApiError::Auth(msg) | ApiError::Validation(msg) => msg.clone(),
                ApiError::NotFound(_) => "Not found".to_string(),
                ApiError::Unauthorized(_) | ApiError::SessionExpired => {
                    "Please sign in".to_string()
                }
                ApiError::RateLimited(_) => "Too many requests, try again shortly".to_string(),
                ApiError::Http(_) | ApiError::Server { .. } | ApiError::Parse(_) => {
                    "External service error".to_string()
                }
            },
            _ => self.to_string(),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expired_session_redirects_to_login() {
        let response = AppError::Api(ApiError::SessionExpired).into_response();
        assert!(response.status().is_redirection());
    }

    #[test]
    fn test_validation_error_is_bad_request() {
        let response =
            AppError::Api(ApiError::Validation("Delivered orders".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_internal_detail_is_not_leaked() {
        let err = AppError::Internal("db password wrong".to_string());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
