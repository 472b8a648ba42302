//! Signed-in customer account endpoints.

use serde::Deserialize;
use tracing::instrument;

use crate::error::ApiError;
use crate::http::ApiSession;
use crate::types::{Order, UserProfile};

#[derive(Deserialize)]
struct ProfileResponse {
    user: UserProfile,
}

#[derive(Deserialize)]
struct OrdersResponse {
    #[serde(default)]
    orders: Vec<Order>,
}

impl ApiSession {
    /// The signed-in customer's profile.
    #[instrument(skip(self))]
    pub async fn profile(&self) -> Result<UserProfile, ApiError> {
        let body: ProfileResponse = self.get("/users/profile").await?;
        Ok(body.user)
    }

    /// The signed-in customer's order history, newest first.
    #[instrument(skip(self))]
    pub async fn my_orders(&self) -> Result<Vec<Order>, ApiError> {
        let body: OrdersResponse = self.get("/users/my-orders").await?;
        Ok(body.orders)
    }
}
