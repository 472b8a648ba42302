//! Session-scoped models for the admin console.

use serde::{Deserialize, Serialize};
use shutterbay_client::Identity;
use shutterbay_core::types::UserId;

/// Session keys for admin session data.
///
/// The credential pair and the admin identity are written together at
/// login and cleared together on invalidation.
pub mod keys {
    /// Credential pair for the commerce API.
    pub const AUTH_TOKENS: &str = "auth_tokens";
    /// The signed-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";
}

/// The signed-in admin, as stored in the session.
///
/// Only constructed after the role check at login; holding one implies the
/// account had the admin role when it signed in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAdmin {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

impl From<Identity> for CurrentAdmin {
    fn from(identity: Identity) -> Self {
        Self {
            id: identity.id,
            name: identity.name,
            email: identity.email,
        }
    }
}
