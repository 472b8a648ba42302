//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use shutterbay_client::ApiError;
use thiserror::Error;

/// Application-level error type for the storefront.
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

    /// User is not authenticated.
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
        // An invalidated API session means the stored credentials are dead.
        // Send the user back to login instead of rendering an error page.
        if matches!(self, Self::Api(ApiError::SessionExpired)) {
            return Redirect::to("/login?error=session_expired").into_response();
        }

        // Capture server-side failures to Sentry
        if matches!(
            self,
            Self::Internal(_)
                | Self::Session(_)
                | Self::Api(
                    ApiError::Http(_) | ApiError::Parse(_) | ApiError::Server { .. }
                )
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
    fn test_app_error_display() {
        let err = AppError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Api(ApiError::NotFound("x".to_string()))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Api(ApiError::Validation("bad".to_string()))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_expired_session_redirects_to_login() {
        let response = AppError::Api(ApiError::SessionExpired).into_response();
        assert!(response.status().is_redirection());
    }
}
