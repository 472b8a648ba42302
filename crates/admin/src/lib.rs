//! Shutterbay admin console library.
//!
//! Back-office views over the Shutterbay commerce API: catalog management,
//! order fulfillment, user listings, and a revenue dashboard. Like the
//! storefront, the console holds no durable state of its own.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
