//! Checkout route handlers.
//!
//! Checkout hands off to the payment provider's hosted page. The API
//! creates a pending order and the hosted session; after the provider
//! redirects back, the session is verified before the cart is emptied.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use rust_decimal::{Decimal, dec};
use serde::Deserialize;
use shutterbay_client::types::{Order, ShippingDetails};
use shutterbay_core::types::{CheckoutSessionId, OrderId, Price};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{CurrentUser, session_keys};
use crate::routes::cart::CartView;
use crate::state::AppState;

/// Flat shipping fee applied to every order.
const SHIPPING_FEE: Decimal = dec!(5);

/// Shipping address form data.
#[derive(Debug, Deserialize)]
pub struct ShippingForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
}

impl From<ShippingForm> for ShippingDetails {
    fn from(form: ShippingForm) -> Self {
        Self {
            first_name: form.first_name,
            last_name: form.last_name,
            email: form.email,
            address: form.address,
            city: form.city,
            state: form.state,
            zip: form.zip,
            country: form.country,
        }
    }
}

/// Query parameters on the provider's success redirect.
#[derive(Debug, Deserialize)]
pub struct SuccessQuery {
    pub session_id: Option<String>,
}

/// Checkout form page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/form.html")]
pub struct CheckoutFormTemplate {
    pub current_user: Option<CurrentUser>,
    pub cart: CartView,
    pub shipping: String,
    pub total: String,
}

/// Order confirmation page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/success.html")]
pub struct CheckoutSuccessTemplate {
    pub current_user: Option<CurrentUser>,
    pub verified: bool,
    pub message: Option<String>,
    pub order: Option<OrderSummaryView>,
}

/// Payment cancelled page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/cancel.html")]
pub struct CheckoutCancelTemplate {
    pub current_user: Option<CurrentUser>,
}

/// Order summary shown on the confirmation page.
#[derive(Clone)]
pub struct OrderSummaryView {
    pub id: String,
    pub total: String,
    pub status: String,
}

impl From<&Order> for OrderSummaryView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.to_string(),
            total: Price::usd(order.total).display(),
            status: order.status.to_string(),
        }
    }
}

/// Display the checkout form with the order summary.
#[instrument(skip(state, session, user))]
pub async fn form(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
) -> Result<Response> {
    let cart = state.carts().load(&session).await;
    if cart.is_empty() {
        return Ok(Redirect::to("/cart").into_response());
    }

    let total = cart.subtotal() + SHIPPING_FEE;

    Ok(CheckoutFormTemplate {
        current_user: Some(user),
        cart: CartView::from(&cart),
        shipping: Price::usd(SHIPPING_FEE).display(),
        total: Price::usd(total).display(),
    }
    .into_response())
}

/// Create the hosted payment session and redirect to the provider.
#[instrument(skip(state, session, form))]
pub async fn create_session(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    session: Session,
    Form(form): Form<ShippingForm>,
) -> Result<Response> {
    let cart = state.carts().load(&session).await;
    if cart.is_empty() {
        return Ok(Redirect::to("/cart").into_response());
    }

    let api = state.sessions().api_session(&session).await;
    let shipping = ShippingDetails::from(form);

    let result = api.create_checkout_session(cart.items(), &shipping).await;
    state.sessions().sync(&session, &api).await?;
    let redirect = result?;

    // Remember the pending order so the success callback can verify it.
    if let Some(order_id) = &redirect.order_id {
        session
            .insert(session_keys::PENDING_ORDER, order_id)
            .await?;
    }

    Ok(Redirect::to(&redirect.url).into_response())
}

/// Verify the payment session after the provider redirects back.
///
/// The cart is only emptied once the API confirms the payment; reloading
/// the page re-verifies idempotently.
#[instrument(skip(state, session, user))]
pub async fn success(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    Query(query): Query<SuccessQuery>,
) -> Result<CheckoutSuccessTemplate> {
    let Some(session_id) = query.session_id else {
        return Ok(CheckoutSuccessTemplate {
            current_user: Some(user),
            verified: false,
            message: Some("Missing payment session".to_string()),
            order: None,
        });
    };

    let pending: Option<OrderId> = session
        .get(session_keys::PENDING_ORDER)
        .await
        .ok()
        .flatten();
    let Some(order_id) = pending else {
        return Ok(CheckoutSuccessTemplate {
            current_user: Some(user),
            verified: false,
            message: Some("No pending order for this session".to_string()),
            order: None,
        });
    };

    let api = state.sessions().api_session(&session).await;
    let result = api
        .verify_payment(&CheckoutSessionId::new(session_id), &order_id)
        .await;
    state.sessions().sync(&session, &api).await?;
    let verification = result?;

    if verification.success {
        state.carts().clear(&session, &api).await?;
        session
            .remove::<OrderId>(session_keys::PENDING_ORDER)
            .await?;
    }

    Ok(CheckoutSuccessTemplate {
        current_user: Some(user),
        verified: verification.success,
        message: verification.message,
        order: verification.order.as_ref().map(OrderSummaryView::from),
    })
}

/// Display the payment cancelled page. The cart is left untouched.
#[instrument(skip(user))]
pub async fn cancel(RequireAuth(user): RequireAuth) -> CheckoutCancelTemplate {
    CheckoutCancelTemplate {
        current_user: Some(user),
    }
}
