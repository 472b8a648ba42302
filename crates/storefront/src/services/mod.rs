//! Application services.

pub mod cart_store;
pub mod session_store;

pub use cart_store::CartStore;
pub use session_store::SessionStore;
