//! Cart storage service.
//!
//! The cart lives in the browser session for everyone. Guests stop there;
//! for signed-in customers every mutation is applied locally first
//! (optimistic) and then mirrored to the remote cart endpoint, whose
//! returned item list overwrites the local one wholesale. If the mirror
//! call fails for a transient reason the optimistic state is kept; only a
//! dead credential propagates, so the user lands on the login page.

use shutterbay_client::{ApiError, ApiSession};
use shutterbay_core::cart::{Cart, CartItem};
use shutterbay_core::types::ProductId;
use tower_sessions::Session;
use tracing::{instrument, warn};

use crate::error::{AppError, Result};
use crate::models::session_keys;

/// Service owning cart persistence and remote sync.
#[derive(Clone, Default)]
pub struct CartStore;

impl CartStore {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// The session cart, empty if none was stored yet.
    ///
    /// A stored cart that no longer parses is removed and replaced with an
    /// empty one.
    pub async fn load(&self, session: &Session) -> Cart {
        match session.get::<Cart>(session_keys::CART).await {
            Ok(cart) => cart.unwrap_or_default(),
            Err(err) => {
                warn!(error = %err, "Stored cart unreadable, dropping it");
                if let Err(err) = session.remove::<serde_json::Value>(session_keys::CART).await {
                    warn!(error = %err, "Failed to drop unreadable cart");
                }
                Cart::new()
            }
        }
    }

    async fn save(&self, session: &Session, cart: &Cart) -> Result<()> {
        session.insert(session_keys::CART, cart).await?;
        Ok(())
    }

    /// Add a product snapshot to the cart.
    #[instrument(skip(self, session, api, item), fields(product_id = %item.product_id))]
    pub async fn add(&self, session: &Session, api: &ApiSession, item: CartItem) -> Result<Cart> {
        let mut cart = self.load(session).await;
        cart.add(item.clone());
        self.save(session, &cart).await?;

        if api.is_authenticated().await {
            match api.push_cart_add(&item).await {
                Ok(items) => {
                    cart.replace(items);
                    self.save(session, &cart).await?;
                }
                Err(err) => self.handle_sync_error(err)?,
            }
        }
        Ok(cart)
    }

    /// Set the quantity of a cart line.
    #[instrument(skip(self, session, api))]
    pub async fn set_quantity(
        &self,
        session: &Session,
        api: &ApiSession,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<Cart> {
        let mut cart = self.load(session).await;
        cart.set_quantity(product_id, quantity);
        self.save(session, &cart).await?;

        if api.is_authenticated().await {
            match api.push_cart_quantity(product_id, quantity.max(1)).await {
                Ok(items) => {
                    cart.replace(items);
                    self.save(session, &cart).await?;
                }
                Err(err) => self.handle_sync_error(err)?,
            }
        }
        Ok(cart)
    }

    /// Remove a cart line.
    #[instrument(skip(self, session, api))]
    pub async fn remove(
        &self,
        session: &Session,
        api: &ApiSession,
        product_id: &ProductId,
    ) -> Result<Cart> {
        let mut cart = self.load(session).await;
        cart.remove(product_id);
        self.save(session, &cart).await?;

        if api.is_authenticated().await {
            match api.push_cart_remove(product_id).await {
                Ok(items) => {
                    cart.replace(items);
                    self.save(session, &cart).await?;
                }
                Err(err) => self.handle_sync_error(err)?,
            }
        }
        Ok(cart)
    }

    /// Empty the cart, locally and remotely.
    #[instrument(skip(self, session, api))]
    pub async fn clear(&self, session: &Session, api: &ApiSession) -> Result<()> {
        self.save(session, &Cart::new()).await?;

        if api.is_authenticated().await {
            if let Err(err) = api.push_cart_clear().await {
                self.handle_sync_error(err)?;
            }
        }
        Ok(())
    }

    /// Replace the session cart with the server copy after login.
    ///
    /// The server cart is authoritative for signed-in customers; whatever
    /// the guest collected before logging in is discarded.
    #[instrument(skip(self, session, api))]
    pub async fn adopt_server_cart(&self, session: &Session, api: &ApiSession) -> Result<Cart> {
        let items = api.fetch_cart().await?;
        let cart = Cart::from_items(items);
        self.save(session, &cart).await?;
        Ok(cart)
    }

    /// Transient sync failures keep the optimistic local state; a dead
    /// credential propagates so the caller redirects to login.
    fn handle_sync_error(&self, err: ApiError) -> Result<()> {
        match err {
            ApiError::SessionExpired => Err(AppError::Api(err)),
            other => {
                warn!(error = %other, "Cart sync failed, keeping local state");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::{MemoryStore, Session};

    use super::*;

    #[tokio::test]
    async fn test_unreadable_stored_cart_is_removed() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        session
            .insert(session_keys::CART, "not a cart")
            .await
            .unwrap();

        let cart = CartStore::new().load(&session).await;
        assert!(cart.is_empty());
        assert!(
            session
                .get::<serde_json::Value>(session_keys::CART)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_missing_cart_loads_empty() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        assert!(CartStore::new().load(&session).await.is_empty());
    }
}
