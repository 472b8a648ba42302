//! Registered user listing.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use serde::Deserialize;
use shutterbay_client::types::UserSummary;
use shutterbay_core::types::Role;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::CurrentAdmin;
use crate::state::AppState;

/// One row of the user listing.
pub struct UserRowView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub joined_at: String,
}

impl From<&UserSummary> for UserRowView {
    fn from(user: &UserSummary) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            joined_at: user.created_at.format("%b %-d, %Y").to_string(),
        }
    }
}

/// User listing template.
#[derive(Template, WebTemplate)]
#[template(path = "users/index.html")]
pub struct UserIndexTemplate {
    pub current_admin: Option<CurrentAdmin>,
    pub users: Vec<UserRowView>,
    pub query: String,
    pub total_count: usize,
}

/// Listing query parameters.
#[derive(Debug, Deserialize)]
pub struct IndexQuery {
    pub q: Option<String>,
}

/// User listing with search on name and email.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Query(query): Query<IndexQuery>,
) -> Result<UserIndexTemplate> {
    let api = state.sessions().api_session(&session).await;
    let result = api.admin_users().await;
    state.sessions().sync(&session, &api).await?;
    let mut users = result?;

    let needle = query.q.clone().unwrap_or_default();
    if !needle.is_empty() {
        let lower = needle.to_lowercase();
        users.retain(|u| {
            u.name.to_lowercase().contains(&lower) || u.email.to_lowercase().contains(&lower)
        });
    }

    let total_count = users.len();
    let rows = users.iter().map(UserRowView::from).collect();

    Ok(UserIndexTemplate {
        current_admin: Some(admin),
        users: rows,
        query: needle,
        total_count,
    })
}
