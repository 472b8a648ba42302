//! Shutterbay Core - Shared types library.
//!
//! This crate provides common types used across all Shutterbay components:
//! - `client` - Typed client for the Shutterbay commerce API
//! - `storefront` - Public-facing storefront
//! - `admin` - Internal back-office console
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and statuses
//! - [`cart`] - The in-memory cart model (line-item merge, clamping, subtotal)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;

pub use cart::{Cart, CartItem};
pub use types::*;
