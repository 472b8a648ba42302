//! Admin console endpoints: catalog management, order fulfillment, users.
//!
//! All of these require an admin credential; the API enforces the role,
//! the client just surfaces the 401/403 it gets back. Product mutations
//! invalidate the shared catalog cache so storefront listings stop
//! serving stale data.

use serde::Deserialize;
use serde_json::json;
use shutterbay_core::types::{OrderId, OrderStatus, ProductId};
use tracing::instrument;

use crate::auth::MessageResponse;
use crate::error::ApiError;
use crate::http::ApiSession;
use crate::types::{Order, Product, ProductInput, RevenuePoint, UserSummary};

#[derive(Deserialize)]
struct UsersResponse {
    #[serde(default)]
    users: Vec<UserSummary>,
}

#[derive(Deserialize)]
struct OrdersResponse {
    #[serde(default)]
    orders: Vec<Order>,
}

#[derive(Deserialize)]
struct ProductsResponse {
    #[serde(default)]
    products: Vec<Product>,
}

#[derive(Deserialize)]
struct ProductResponse {
    product: Product,
}

#[derive(Deserialize)]
struct RevenueResponse {
    #[serde(default)]
    data: Vec<RevenuePoint>,
}

impl ApiSession {
    /// All registered users.
    #[instrument(skip(self))]
    pub async fn admin_users(&self) -> Result<Vec<UserSummary>, ApiError> {
        let body: UsersResponse = self.get("/admin/users").await?;
        Ok(body.users)
    }

    /// All orders across the store, newest first.
    #[instrument(skip(self))]
    pub async fn admin_orders(&self) -> Result<Vec<Order>, ApiError> {
        let body: OrdersResponse = self.get("/admin/orders").await?;
        Ok(body.orders)
    }

    /// Move an order to a new fulfillment status.
    ///
    /// Delivered is terminal: if the caller knows the current status and
    /// the transition is not allowed, this fails locally without a
    /// network call. The API enforces the same rule.
    #[instrument(skip(self))]
    pub async fn update_order_status(
        &self,
        order_id: &OrderId,
        current: OrderStatus,
        next: OrderStatus,
    ) -> Result<String, ApiError> {
        if !current.can_transition_to(next) {
            return Err(ApiError::Validation(format!(
                "{current} orders can no longer be updated"
            )));
        }

        let body: MessageResponse = self
            .put(
                &format!("/admin/orders/{order_id}/status"),
                json!({ "status": next }),
            )
            .await?;
        Ok(body.message)
    }

    /// The full catalog, including out-of-stock products.
    #[instrument(skip(self))]
    pub async fn admin_products(&self) -> Result<Vec<Product>, ApiError> {
        let body: ProductsResponse = self.get("/admin/products").await?;
        Ok(body.products)
    }

    /// One product for editing.
    #[instrument(skip(self))]
    pub async fn admin_product(&self, id: &ProductId) -> Result<Product, ApiError> {
        let body: ProductResponse = self.get(&format!("/admin/products/{id}")).await?;
        Ok(body.product)
    }

    /// Create a catalog product.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_product(&self, input: &ProductInput) -> Result<Product, ApiError> {
        let body: ProductResponse = self
            .post("/admin/products", serde_json::to_value(input)?)
            .await?;
        self.client().invalidate_catalog_cache();
        Ok(body.product)
    }

    /// Replace a catalog product wholesale.
    #[instrument(skip(self, input))]
    pub async fn update_product(
        &self,
        id: &ProductId,
        input: &ProductInput,
    ) -> Result<Product, ApiError> {
        let body: ProductResponse = self
            .put(&format!("/admin/products/{id}"), serde_json::to_value(input)?)
            .await?;
        self.client().invalidate_catalog_cache();
        Ok(body.product)
    }

    /// Delete a catalog product.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<String, ApiError> {
        let body: MessageResponse = self.delete(&format!("/admin/products/{id}")).await?;
        self.client().invalidate_catalog_cache();
        Ok(body.message)
    }

    /// Monthly revenue series for the dashboard chart.
    #[instrument(skip(self))]
    pub async fn revenue_stats(&self) -> Result<Vec<RevenuePoint>, ApiError> {
        let body: RevenueResponse = self.get("/admin/revenue-stats").await?;
        Ok(body.data)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_delivered_order_update_fails_without_network() {
        // Unroutable base URL: a network attempt would error differently.
        let session = crate::ApiClient::new("http://127.0.0.1:1").anonymous();

        let err = session
            .update_order_status(
                &OrderId::new("o1"),
                OrderStatus::Delivered,
                OrderStatus::Shipped,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Validation(_)));
    }
}
