//! Shutterbay API client.
//!
//! Typed access to the retailer's remote JSON API. Everything the
//! storefront and admin console show on screen comes through this crate;
//! no business state lives on the rendering side.
//!
//! # Architecture
//!
//! [`ApiClient`] is the shared transport: one `reqwest` client, the API
//! base URL, and the catalog cache. [`ApiSession`] is a per-browser-session
//! handle carrying the credential pair. Requests attach the bearer
//! credential; an unauthorized response triggers at most one credential
//! refresh (single-flight across concurrent requests) followed by one
//! replay of the original request. A failed refresh invalidates the
//! session, which the apps translate into a redirect to the login view.
//!
//! Endpoint groups live in their own modules as `impl ApiSession` blocks:
//! [`auth`], [`catalog`], [`cart`], [`checkout`], [`account`], [`admin`].
//! The third-party image host upload sink is independent of the primary
//! API and lives in [`images`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod account;
pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
mod error;
mod http;
pub mod images;
pub mod retry;
pub mod types;

pub use auth::{Identity, TokenPair};
pub use error::ApiError;
pub use http::{ApiClient, ApiSession};
pub use images::ImageHost;
