//! Wire types for the Shutterbay API.
//!
//! The API speaks camelCase JSON. Prices come back as plain decimal
//! numbers; timestamps are RFC 3339 strings. List endpoints either return
//! a bare array (`/products`) or a single-key wrapper object
//! (`{"orders": [...]}`); the wrapper structs live next to the endpoint
//! methods that unwrap them.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shutterbay_core::cart::CartItem;
use shutterbay_core::types::{OrderId, OrderStatus, Price, ProductId, Role, UserId};

/// A catalog product as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub brand: String,
    /// Category name, one of the fixed storefront departments.
    pub category: String,
    /// List price in USD.
    pub price: Decimal,
    /// Percentage discount currently applied, if any.
    #[serde(default)]
    pub discount: Option<Decimal>,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub description: String,
    /// Primary image URL.
    #[serde(default)]
    pub image: String,
    /// Additional gallery image URLs.
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub rating: Option<Decimal>,
    #[serde(default)]
    pub top_seller: bool,
    /// Free-form spec sheet rows (sensor, mount, weight, ...).
    #[serde(default)]
    pub specifications: BTreeMap<String, String>,
}

impl Product {
    /// The list price as a [`Price`].
    #[must_use]
    pub const fn list_price(&self) -> Price {
        Price::usd(self.price)
    }

    /// The effective price after any discount, rounded to cents.
    #[must_use]
    pub fn effective_price(&self) -> Price {
        match self.discount {
            Some(discount) => self.list_price().with_discount(discount),
            None => self.list_price(),
        }
    }

    /// Whether the product can currently be added to a cart.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Snapshot this product into a cart line at the effective price.
    #[must_use]
    pub fn to_cart_item(&self, quantity: u32) -> CartItem {
        CartItem {
            product_id: self.id.clone(),
            name: self.name.clone(),
            price: self.effective_price().amount,
            image: self.image.clone(),
            quantity: quantity.max(1),
        }
    }
}

/// Payload for creating or replacing a product through the admin API.
///
/// Updates are full document replacements, so every field is required
/// except the optional discount.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    pub brand: String,
    pub category: String,
    pub price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<Decimal>,
    pub stock: u32,
    pub description: String,
    pub image: String,
    pub images: Vec<String>,
    pub top_seller: bool,
    pub specifications: BTreeMap<String, String>,
}

/// One line of an order, a price-and-name snapshot taken at purchase time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(default)]
    pub product_id: Option<ProductId>,
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub image: String,
    pub quantity: u32,
}

/// The customer an order belongs to, as embedded in admin order listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCustomer {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// An order as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    pub total: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    /// Present in admin listings, absent in a customer's own history.
    #[serde(default)]
    pub user: Option<OrderCustomer>,
    #[serde(default)]
    pub shipping: Option<ShippingDetails>,
}

/// Shipping address collected at checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
}

/// A user row in the admin user listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// The signed-in user's own profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// One month of revenue for the admin dashboard chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenuePoint {
    pub month: String,
    pub revenue: Decimal,
}

/// Redirect target for a freshly created hosted payment session.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRedirect {
    /// Hosted payment page URL to send the customer to.
    pub url: String,
    /// The pending order the session was created for.
    #[serde(default)]
    pub order_id: Option<OrderId>,
}

/// Outcome of verifying a completed payment session.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentVerification {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub order: Option<Order>,
}
