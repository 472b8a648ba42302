//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! Mutations go through [`CartStore`]: local state updates first, then the
//! remote cart for signed-in customers.
//!
//! [`CartStore`]: crate::services::CartStore

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::Deserialize;
use shutterbay_core::cart::Cart;
use shutterbay_core::types::{Price, ProductId};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::CurrentUser;
use crate::state::AppState;

/// Cart item display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub product_id: String,
    pub name: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
    pub image: String,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u32,
}

impl CartView {
    /// Create an empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            subtotal: "$0.00".to_string(),
            item_count: 0,
        }
    }
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart
                .items()
                .iter()
                .map(|item| CartItemView {
                    product_id: item.product_id.to_string(),
                    name: item.name.clone(),
                    quantity: item.quantity,
                    price: Price::usd(item.price).display(),
                    line_price: Price::usd(
                        item.price * rust_decimal::Decimal::from(item.quantity),
                    )
                    .display(),
                    image: item.image.clone(),
                })
                .collect(),
            subtotal: Price::usd(cart.subtotal()).display(),
            item_count: cart.total_quantity(),
        }
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
    pub quantity: Option<u32>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: String,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub current_user: Option<CurrentUser>,
    pub cart: CartView,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Display cart page.
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
) -> CartShowTemplate {
    let cart = state.carts().load(&session).await;

    CartShowTemplate {
        current_user: user,
        cart: CartView::from(&cart),
    }
}

/// Add item to cart (HTMX).
///
/// Fetches the product to take a price snapshot, then applies the
/// optimistic local add and mirrors it to the remote cart. Returns the
/// cart count badge with an HTMX trigger to update other elements.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let api = state.sessions().api_session(&session).await;
    let product_id = ProductId::new(form.product_id);

    let product = api.product(&product_id).await?;
    if !product.in_stock() {
        return Err(AppError::BadRequest("Product is out of stock".to_string()));
    }

    let item = product.to_cart_item(form.quantity.unwrap_or(1));
    let result = state.carts().add(&session, &api, item).await;
    state.sessions().sync(&session, &api).await?;
    let cart = result?;

    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartCountTemplate {
            count: cart.total_quantity(),
        },
    )
        .into_response())
}

/// Update cart item quantity (HTMX).
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let api = state.sessions().api_session(&session).await;
    let product_id = ProductId::new(form.product_id);

    let result = state
        .carts()
        .set_quantity(&session, &api, &product_id, form.quantity)
        .await;
    state.sessions().sync(&session, &api).await?;
    let cart = result?;

    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::from(&cart),
        },
    )
        .into_response())
}

/// Remove item from cart (HTMX).
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    let api = state.sessions().api_session(&session).await;
    let product_id = ProductId::new(form.product_id);

    let result = state.carts().remove(&session, &api, &product_id).await;
    state.sessions().sync(&session, &api).await?;
    let cart = result?;

    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::from(&cart),
        },
    )
        .into_response())
}

/// Get cart count badge (HTMX).
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: Session) -> CartCountTemplate {
    let cart = state.carts().load(&session).await;
    CartCountTemplate {
        count: cart.total_quantity(),
    }
}
