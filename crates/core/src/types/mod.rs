//! Shared type definitions.

mod email;
mod id;
mod price;
mod status;

pub use email::{Email, EmailError};
pub use id::{CheckoutSessionId, OrderId, ProductId, UserId};
pub use price::{CurrencyCode, Price};
pub use status::{OrderStatus, Role};
