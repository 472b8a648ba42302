//! Order fulfillment: listing and status changes.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use shutterbay_client::types::Order;
use shutterbay_core::types::{OrderId, OrderStatus, Price};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::CurrentAdmin;
use crate::state::AppState;

/// Orders shown per listing page.
const PAGE_SIZE: usize = 20;

/// One row of the order listing.
pub struct OrderRowView {
    pub id: String,
    pub customer: String,
    pub email: String,
    pub placed_at: String,
    pub item_count: u32,
    pub total: String,
    pub status: OrderStatus,
    /// Statuses the row's dropdown offers. Empty for terminal orders.
    pub next_statuses: Vec<OrderStatus>,
}

impl From<&Order> for OrderRowView {
    fn from(order: &Order) -> Self {
        let (customer, email) = order
            .user
            .as_ref()
            .map_or((String::from("Guest"), String::new()), |u| {
                (u.name.clone(), u.email.clone())
            });

        let next_statuses = OrderStatus::ALL
            .into_iter()
            .filter(|&s| s != order.status && order.status.can_transition_to(s))
            .collect();

        Self {
            id: order.id.to_string(),
            customer,
            email,
            placed_at: order.created_at.format("%b %-d, %Y").to_string(),
            item_count: order.items.iter().map(|i| i.quantity).sum(),
            total: Price::usd(order.total).display(),
            status: order.status,
            next_statuses,
        }
    }
}

/// Order listing template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrderIndexTemplate {
    pub current_admin: Option<CurrentAdmin>,
    pub orders: Vec<OrderRowView>,
    pub query: String,
    pub current_page: u32,
    pub total_pages: u32,
    pub total_count: usize,
    pub notice: Option<String>,
    pub error: Option<String>,
}

/// Listing query parameters.
#[derive(Debug, Deserialize)]
pub struct IndexQuery {
    pub q: Option<String>,
    pub page: Option<u32>,
    pub notice: Option<String>,
    pub error: Option<String>,
}

/// Order listing with search and paging. Search matches order id,
/// customer name, and email.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Query(query): Query<IndexQuery>,
) -> Result<OrderIndexTemplate> {
    let api = state.sessions().api_session(&session).await;
    let result = api.admin_orders().await;
    state.sessions().sync(&session, &api).await?;
    let mut orders = result?;

    let needle = query.q.clone().unwrap_or_default();
    if !needle.is_empty() {
        let lower = needle.to_lowercase();
        orders.retain(|o| {
            o.id.to_string().to_lowercase().contains(&lower)
                || o.user.as_ref().is_some_and(|u| {
                    u.name.to_lowercase().contains(&lower)
                        || u.email.to_lowercase().contains(&lower)
                })
        });
    }

    let total_count = orders.len();
    let total_pages = u32::try_from(total_count.div_ceil(PAGE_SIZE)).unwrap_or(1).max(1);
    let current_page = query.page.unwrap_or(1).clamp(1, total_pages);
    let offset = usize::try_from(current_page - 1).unwrap_or(0) * PAGE_SIZE;

    let rows = orders
        .iter()
        .skip(offset)
        .take(PAGE_SIZE)
        .map(OrderRowView::from)
        .collect();

    Ok(OrderIndexTemplate {
        current_admin: Some(admin),
        orders: rows,
        query: needle,
        current_page,
        total_pages,
        total_count,
        notice: query.notice,
        error: query.error,
    })
}

/// Status change form data. Carries the status the row displayed so the
/// transition can be validated without refetching the order.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub current: String,
    pub status: String,
}

/// Move an order to a new status.
///
/// Delivered orders are rejected before any network call is made.
#[instrument(skip(state, session, form))]
pub async fn update_status(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
    Form(form): Form<StatusForm>,
) -> Result<Response> {
    let current: OrderStatus = form
        .current
        .parse()
        .map_err(AppError::BadRequest)?;
    let next: OrderStatus = form.status.parse().map_err(AppError::BadRequest)?;

    let api = state.sessions().api_session(&session).await;
    let result = api
        .update_order_status(&OrderId::new(&id), current, next)
        .await;
    state.sessions().sync(&session, &api).await?;

    match result {
        Ok(_) => Ok(Redirect::to("/orders?notice=status_updated").into_response()),
        Err(shutterbay_client::ApiError::Validation(msg)) => {
            tracing::warn!(order = %id, "Rejected status change: {msg}");
            Ok(Redirect::to("/orders?error=transition_rejected").into_response())
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::dec;
    use shutterbay_client::types::{OrderCustomer, OrderItem};

    fn sample_order(status: OrderStatus) -> Order {
        Order {
            id: OrderId::new("ord-1"),
            items: vec![OrderItem {
                product_id: None,
                name: "EOS R6".to_string(),
                price: dec!(2499.99),
                image: String::new(),
                quantity: 2,
            }],
            total: dec!(4999.98),
            status,
            created_at: Utc::now(),
            user: Some(OrderCustomer {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
            }),
            shipping: None,
        }
    }

    #[test]
    fn test_delivered_row_offers_no_transitions() {
        let row = OrderRowView::from(&sample_order(OrderStatus::Delivered));
        assert!(row.next_statuses.is_empty());
    }

    #[test]
    fn test_open_row_offers_other_statuses() {
        let row = OrderRowView::from(&sample_order(OrderStatus::Pending));
        assert_eq!(row.next_statuses.len(), 4);
        assert!(!row.next_statuses.contains(&OrderStatus::Pending));
    }

    #[test]
    fn test_row_sums_item_quantities() {
        let row = OrderRowView::from(&sample_order(OrderStatus::Pending));
        assert_eq!(row.item_count, 2);
        assert_eq!(row.total, "$4999.98");
    }
}
