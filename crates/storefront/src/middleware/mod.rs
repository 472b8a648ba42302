//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. Session layer (tower-sessions with in-memory store)

pub mod auth;
pub mod session;

pub use auth::{AuthRejection, OptionalAuth, RequireAuth};
pub use session::create_session_layer;
