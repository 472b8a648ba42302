//! Session middleware configuration.
//!
//! In-memory sessions carrying only the admin's credential pair. The
//! console keeps nothing else client-side, so a restart just signs
//! operators out.

use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::AdminConfig;

/// Session cookie name, distinct from the storefront's so both can run
/// on the same host during development.
pub const SESSION_COOKIE_NAME: &str = "sb_admin_session";

/// Session expiry time in seconds (24 hours). Shorter than the
/// storefront's; admin sessions should not linger.
const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

/// Create the session layer with an in-memory store.
#[must_use]
pub fn create_session_layer(config: &AdminConfig) -> SessionManagerLayer<MemoryStore> {
    let store = MemoryStore::default();

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
