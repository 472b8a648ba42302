//! Dashboard: store-wide counts and the monthly revenue chart.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use shutterbay_core::types::Price;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::CurrentAdmin;
use crate::state::AppState;

/// One bar of the revenue chart, scaled against the best month.
pub struct RevenueBar {
    pub month: String,
    pub revenue: String,
    /// Bar width as a percentage of the chart, 0 to 100.
    pub width_pct: u32,
}

/// Dashboard page template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub current_admin: Option<CurrentAdmin>,
    pub product_count: usize,
    pub order_count: usize,
    pub pending_count: usize,
    pub user_count: usize,
    pub total_revenue: String,
    pub revenue: Vec<RevenueBar>,
}

/// Render the dashboard.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
) -> Result<DashboardTemplate> {
    let api = state.sessions().api_session(&session).await;
    let products = api.admin_products().await;
    let orders = api.admin_orders().await;
    let users = api.admin_users().await;
    let stats = api.revenue_stats().await;
    state.sessions().sync(&session, &api).await?;

    let products = products?;
    let orders = orders?;
    let users = users?;
    let stats = stats?;

    let pending_count = orders
        .iter()
        .filter(|o| o.status == shutterbay_core::types::OrderStatus::Pending)
        .count();
    let total_revenue: Decimal = stats.iter().map(|p| p.revenue).sum();

    let max = stats
        .iter()
        .map(|p| p.revenue)
        .max()
        .unwrap_or(Decimal::ONE);
    let revenue = stats
        .iter()
        .map(|p| RevenueBar {
            month: p.month.clone(),
            revenue: Price::usd(p.revenue).display(),
            width_pct: bar_width(p.revenue, max),
        })
        .collect();

    Ok(DashboardTemplate {
        current_admin: Some(admin),
        product_count: products.len(),
        order_count: orders.len(),
        pending_count,
        user_count: users.len(),
        total_revenue: Price::usd(total_revenue).display(),
        revenue,
    })
}

/// Scale a revenue figure to a 0-100 bar width against the best month.
fn bar_width(revenue: Decimal, max: Decimal) -> u32 {
    if max <= Decimal::ZERO || revenue <= Decimal::ZERO {
        return 0;
    }
    let pct = revenue * Decimal::ONE_HUNDRED / max;
    pct.to_u32().unwrap_or(100).min(100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::dec;

    #[test]
    fn test_bar_width_scales_against_max() {
        assert_eq!(bar_width(dec!(50), dec!(100)), 50);
        assert_eq!(bar_width(dec!(100), dec!(100)), 100);
        assert_eq!(bar_width(dec!(0), dec!(100)), 0);
    }

    #[test]
    fn test_bar_width_handles_empty_months() {
        assert_eq!(bar_width(dec!(10), Decimal::ZERO), 0);
    }
}
