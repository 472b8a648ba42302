//! Hosted payment checkout endpoints.
//!
//! Checkout hands the customer off to the payment provider's hosted page.
//! The API creates the session (and a pending order) and returns the
//! redirect URL; after the provider redirects back, the session is
//! verified server-side before the order is shown as paid.

use serde_json::json;
use shutterbay_core::cart::CartItem;
use shutterbay_core::types::{CheckoutSessionId, OrderId};
use tracing::instrument;

use crate::error::ApiError;
use crate::http::ApiSession;
use crate::types::{CheckoutRedirect, PaymentVerification, ShippingDetails};

impl ApiSession {
    /// Create a hosted payment session for the given cart and address.
    ///
    /// Returns the provider URL to redirect the customer to. The API
    /// prices the order itself from the submitted lines, adding the flat
    /// shipping fee; nothing is charged until the hosted page completes.
    #[instrument(skip(self, items, shipping), fields(lines = items.len()))]
    pub async fn create_checkout_session(
        &self,
        items: &[CartItem],
        shipping: &ShippingDetails,
    ) -> Result<CheckoutRedirect, ApiError> {
        let lines: Vec<serde_json::Value> = items
            .iter()
            .map(|item| {
                json!({
                    "id": item.product_id,
                    "name": item.name,
                    "price": item.price,
                    "image": item.image,
                    "quantity": item.quantity,
                })
            })
            .collect();

        self.post(
            "/payment/create-checkout-session",
            json!({ "items": lines, "shipping": shipping }),
        )
        .await
    }

    /// Verify a completed payment session against its pending order.
    #[instrument(skip(self))]
    pub async fn verify_payment(
        &self,
        session_id: &CheckoutSessionId,
        order_id: &OrderId,
    ) -> Result<PaymentVerification, ApiError> {
        self.post(
            "/payment/verify-session",
            json!({ "sessionId": session_id, "orderId": order_id }),
        )
        .await
    }
}
