//! Error type for the Shutterbay API client.

use thiserror::Error;

/// Errors returned by the Shutterbay API client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// An auth endpoint rejected the supplied credentials (invalid
    /// credentials, unverified email, duplicate registration).
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The API returned 401 and no retry is possible.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The credential refresh failed or no refresh credential was present.
    /// The session has been invalidated; callers must clear stored
    /// credentials and navigate to the login view.
    #[error("session expired")]
    SessionExpired,

    /// The requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The API rejected the request payload.
    #[error("validation error: {0}")]
    Validation(String),

    /// The API is rate limiting us. Contains the retry-after duration in seconds.
    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The API returned an unexpected status.
    #[error("server error (HTTP {status}): {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body, truncated.
        message: String,
    },

    /// Network-level failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body could not be parsed.
    #[error("failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),
}
