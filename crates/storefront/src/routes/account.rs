//! Account route handlers (require auth).

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use chrono::{DateTime, Utc};
use shutterbay_client::types::Order;
use shutterbay_core::types::Price;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::CurrentUser;
use crate::state::AppState;

/// Profile display data for templates.
#[derive(Clone)]
pub struct ProfileView {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub member_since: Option<String>,
}

/// Order row display data for templates.
#[derive(Clone)]
pub struct OrderRowView {
    pub id: String,
    pub placed_at: String,
    pub status: String,
    pub item_count: usize,
    pub total: String,
}

impl From<&Order> for OrderRowView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.to_string(),
            placed_at: format_date(&order.created_at),
            status: order.status.to_string(),
            item_count: order.items.len(),
            total: Price::usd(order.total).display(),
        }
    }
}

fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/profile.html")]
pub struct ProfileTemplate {
    pub current_user: Option<CurrentUser>,
    pub profile: ProfileView,
}

/// Order history page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/orders.html")]
pub struct OrdersTemplate {
    pub current_user: Option<CurrentUser>,
    pub orders: Vec<OrderRowView>,
}

/// Display the profile page.
#[instrument(skip(state, session, user))]
pub async fn profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
) -> Result<ProfileTemplate> {
    let api = state.sessions().api_session(&session).await;
    let result = api.profile().await;
    state.sessions().sync(&session, &api).await?;
    let profile = result?;

    Ok(ProfileTemplate {
        current_user: Some(user),
        profile: ProfileView {
            name: profile.name,
            email: profile.email,
            phone: profile.phone,
            member_since: profile.created_at.as_ref().map(format_date),
        },
    })
}

/// Display the order history page.
#[instrument(skip(state, session, user))]
pub async fn orders(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
) -> Result<OrdersTemplate> {
    let api = state.sessions().api_session(&session).await;
    let result = api.my_orders().await;
    state.sessions().sync(&session, &api).await?;
    let orders = result?;

    Ok(OrdersTemplate {
        current_user: Some(user),
        orders: orders.iter().map(OrderRowView::from).collect(),
    })
}
