//! Remote cart endpoints for signed-in customers.
//!
//! Every mutation answers with the server's full item list, which the
//! caller feeds into [`Cart::replace`]: the server copy is authoritative
//! and overwrites local state wholesale. Guest carts never touch these
//! endpoints.
//!
//! [`Cart::replace`]: shutterbay_core::cart::Cart::replace

use serde::Deserialize;
use serde_json::json;
use shutterbay_core::cart::CartItem;
use shutterbay_core::types::ProductId;
use tracing::instrument;

use crate::error::ApiError;
use crate::http::ApiSession;

#[derive(Deserialize)]
struct CartResponse {
    #[serde(default)]
    items: Vec<CartItem>,
}

impl ApiSession {
    /// The signed-in customer's server-side cart.
    #[instrument(skip(self))]
    pub async fn fetch_cart(&self) -> Result<Vec<CartItem>, ApiError> {
        let body: CartResponse = self.get("/cart").await?;
        Ok(body.items)
    }

    /// Add a product snapshot to the server-side cart.
    #[instrument(skip(self, item), fields(product_id = %item.product_id))]
    pub async fn push_cart_add(&self, item: &CartItem) -> Result<Vec<CartItem>, ApiError> {
        let body: CartResponse = self
            .post(
                "/cart",
                json!({
                    "product": {
                        "id": item.product_id,
                        "name": item.name,
                        "price": item.price,
                        "image": item.image,
                    },
                    "qty": item.quantity,
                }),
            )
            .await?;
        Ok(body.items)
    }

    /// Set the quantity of one cart line.
    #[instrument(skip(self))]
    pub async fn push_cart_quantity(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<Vec<CartItem>, ApiError> {
        let body: CartResponse = self
            .put(&format!("/cart/{product_id}"), json!({ "qty": quantity }))
            .await?;
        Ok(body.items)
    }

    /// Remove one line from the server-side cart.
    #[instrument(skip(self))]
    pub async fn push_cart_remove(
        &self,
        product_id: &ProductId,
    ) -> Result<Vec<CartItem>, ApiError> {
        let body: CartResponse = self.delete(&format!("/cart/{product_id}")).await?;
        Ok(body.items)
    }

    /// Empty the server-side cart, e.g. after a completed checkout.
    #[instrument(skip(self))]
    pub async fn push_cart_clear(&self) -> Result<(), ApiError> {
        let _: serde_json::Value = self.delete("/cart").await?;
        Ok(())
    }
}
