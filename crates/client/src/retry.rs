//! Retry policy for unauthorized responses.
//!
//! The policy is a pure function over the response status and an explicit
//! attempt counter threaded through [`ApiSession::execute`]. No flag on a
//! request object is ever mutated; the counter is the whole state.
//!
//! [`ApiSession::execute`]: crate::ApiSession

use reqwest::StatusCode;

/// Maximum number of refresh-then-replay cycles per logical request.
pub const MAX_REFRESH_RETRIES: u32 = 1;

/// Whether an unauthorized response on the given attempt should trigger a
/// credential refresh and replay.
///
/// Only the first attempt qualifies; the replayed request reports its
/// outcome to the caller whatever it is.
#[must_use]
pub const fn should_refresh(status: StatusCode, attempt: u32) -> bool {
    status.as_u16() == 401 && attempt < MAX_REFRESH_RETRIES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_unauthorized_triggers_refresh() {
        assert!(should_refresh(StatusCode::UNAUTHORIZED, 0));
    }

    #[test]
    fn test_replayed_request_is_never_retried_again() {
        assert!(!should_refresh(StatusCode::UNAUTHORIZED, 1));
        assert!(!should_refresh(StatusCode::UNAUTHORIZED, 2));
    }

    #[test]
    fn test_other_statuses_never_refresh() {
        assert!(!should_refresh(StatusCode::OK, 0));
        assert!(!should_refresh(StatusCode::FORBIDDEN, 0));
        assert!(!should_refresh(StatusCode::INTERNAL_SERVER_ERROR, 0));
    }
}
