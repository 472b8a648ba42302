//! Console sign-in and sign-out.
//!
//! Login goes through the same auth endpoints as the storefront, but the
//! console refuses identities without the admin role before storing any
//! credentials.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::filters;
use crate::models::CurrentAdmin;
use crate::state::AppState;

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Query parameters for error display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
}

/// Sign-in page template.
#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub current_admin: Option<CurrentAdmin>,
    pub error: Option<String>,
}

/// Display the sign-in page.
pub async fn login_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    LoginTemplate {
        current_admin: None,
        error: query.error,
    }
}

/// Handle sign-in.
///
/// Non-admin accounts are rejected here even when the API accepts the
/// password; the credentials returned for them are discarded.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let api = state.api().anonymous();

    match api.login(&form.email, &form.password).await {
        Ok(identity) => {
            if !identity.is_admin() {
                tracing::warn!(email = %form.email, "Non-admin sign-in attempt on console");
                return Redirect::to("/login?error=not_admin").into_response();
            }

            let Some(tokens) = api.tokens().await else {
                tracing::error!("Login succeeded but no credentials were installed");
                return Redirect::to("/login?error=failed").into_response();
            };

            let admin = CurrentAdmin::from(identity);
            if let Err(e) = state.sessions().establish(&session, tokens, &admin).await {
                tracing::error!("Failed to set session: {e}");
                return Redirect::to("/login?error=session").into_response();
            }

            Redirect::to("/").into_response()
        }
        Err(e) => {
            tracing::warn!("Console login failed: {e}");
            Redirect::to("/login?error=credentials").into_response()
        }
    }
}

/// Handle sign-out.
#[instrument(skip(state, session))]
pub async fn logout(State(state): State<AppState>, session: Session) -> Response {
    let api = state.sessions().api_session(&session).await;
    api.logout().await;

    if let Err(e) = state.sessions().clear(&session).await {
        tracing::error!("Failed to clear session: {e}");
    }

    if let Err(e) = session.flush().await {
        tracing::error!("Failed to flush session: {e}");
    }

    Redirect::to("/login").into_response()
}
