//! Session-related types.
//!
//! Types stored in the session for authentication and cart state.

use serde::{Deserialize, Serialize};
use shutterbay_core::types::{Role, UserId};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<shutterbay_client::Identity> for CurrentUser {
    fn from(identity: shutterbay_client::Identity) -> Self {
        Self {
            id: identity.id,
            name: identity.name,
            email: identity.email,
            role: identity.role,
        }
    }
}

/// Session keys for authentication and cart data.
///
/// The credential pair and the current user form one unit: they are
/// written together at login and cleared together when the session is
/// invalidated.
pub mod keys {
    /// Key for the API credential pair ([`TokenPair`]).
    ///
    /// [`TokenPair`]: shutterbay_client::TokenPair
    pub const AUTH_TOKENS: &str = "auth_tokens";

    /// Key for the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the session cart.
    pub const CART: &str = "cart";

    /// Key for the pending order awaiting payment verification.
    pub const PENDING_ORDER: &str = "pending_order";
}
