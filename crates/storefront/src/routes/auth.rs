//! Authentication route handlers.
//!
//! Handles login, registration, email verification, and password reset
//! against the Shutterbay API's auth endpoints.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use shutterbay_core::types::Email;
use tower_sessions::Session;
use tracing::instrument;

use crate::filters;
use crate::models::CurrentUser;
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

/// Forgot password form data.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordForm {
    pub email: String,
}

/// Reset password form data.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordForm {
    pub password: String,
    pub password_confirm: String,
}

/// Query parameters for error/success display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub current_user: Option<CurrentUser>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub current_user: Option<CurrentUser>,
    pub error: Option<String>,
}

/// Registration success page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register_success.html")]
pub struct RegisterSuccessTemplate {
    pub current_user: Option<CurrentUser>,
    pub email: String,
}

/// Forgot password page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/forgot_password.html")]
pub struct ForgotPasswordTemplate {
    pub current_user: Option<CurrentUser>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Reset password page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/reset_password.html")]
pub struct ResetPasswordTemplate {
    pub current_user: Option<CurrentUser>,
    pub error: Option<String>,
    pub token: String,
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    LoginTemplate {
        current_user: None,
        error: query.error,
        success: query.success,
    }
}

/// Handle login form submission.
///
/// On success the credential pair and user are stored together and the
/// server cart replaces whatever the guest session had collected.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let api = state.api().anonymous();

    match api.login(&form.email, &form.password).await {
        Ok(identity) => {
            let Some(tokens) = api.tokens().await else {
                tracing::error!("Login succeeded but no credentials were installed");
                return Redirect::to("/login?error=failed").into_response();
            };

            let user = CurrentUser::from(identity);
            if let Err(e) = state.sessions().establish(&session, tokens, &user).await {
                tracing::error!("Failed to set session: {e}");
                return Redirect::to("/login?error=session").into_response();
            }

            // The server cart is authoritative once signed in.
            if let Err(e) = state.carts().adopt_server_cart(&session, &api).await {
                tracing::warn!("Failed to load server cart after login: {e}");
            }

            Redirect::to("/").into_response()
        }
        Err(e) => {
            tracing::warn!("Login failed: {e}");
            Redirect::to("/login?error=credentials").into_response()
        }
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    RegisterTemplate {
        current_user: None,
        error: query.error,
    }
}

/// Validate registration input before it reaches the API.
///
/// Returns the error code shown on the register page.
fn validate_registration(form: &RegisterForm) -> Result<Email, &'static str> {
    let email = Email::parse(form.email.trim()).map_err(|_| "email_invalid")?;

    if form.password != form.password_confirm {
        return Err("password_mismatch");
    }
    if form.password.len() < 8 {
        return Err("password_too_short");
    }
    Ok(email)
}

/// Handle registration form submission.
///
/// The account stays inactive until the emailed verification link is
/// followed, so the user is not logged in here.
#[instrument(skip(state, form))]
pub async fn register(State(state): State<AppState>, Form(form): Form<RegisterForm>) -> Response {
    let email = match validate_registration(&form) {
        Ok(email) => email,
        Err(code) => return Redirect::to(&format!("/register?error={code}")).into_response(),
    };

    let api = state.api().anonymous();
    match api
        .register(&form.name, email.as_str(), &form.password)
        .await
    {
        Ok(_) => RegisterSuccessTemplate {
            current_user: None,
            email: email.into_inner(),
        }
        .into_response(),
        Err(e) => {
            tracing::warn!("Registration failed: {e}");
            let error_msg = e.to_string();
            if error_msg.contains("taken") || error_msg.contains("already") {
                Redirect::to("/register?error=email_taken").into_response()
            } else {
                Redirect::to("/register?error=failed").into_response()
            }
        }
    }
}

// =============================================================================
// Email Verification Route
// =============================================================================

/// Handle the emailed verification link.
#[instrument(skip(state, token))]
pub async fn verify_email(State(state): State<AppState>, Path(token): Path<String>) -> Response {
    let api = state.api().anonymous();

    match api.verify_email(&token).await {
        Ok(_) => Redirect::to("/login?success=verified").into_response(),
        Err(e) => {
            tracing::warn!("Email verification failed: {e}");
            Redirect::to("/login?error=verification_failed").into_response()
        }
    }
}

// =============================================================================
// Password Reset Routes
// =============================================================================

/// Display the forgot password page.
pub async fn forgot_password_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    ForgotPasswordTemplate {
        current_user: None,
        error: query.error,
        success: query.success,
    }
}

/// Handle forgot password form submission.
///
/// Always shows success to prevent email enumeration.
#[instrument(skip(state, form))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Form(form): Form<ForgotPasswordForm>,
) -> Response {
    let api = state.api().anonymous();

    if let Err(e) = api.request_password_reset(&form.email).await {
        tracing::warn!("Password reset request failed: {e}");
    }

    Redirect::to("/forgot-password?success=email_sent").into_response()
}

/// Display the reset password page.
///
/// Called when the user follows the reset link in the email.
pub async fn reset_password_page(
    Path(token): Path<String>,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    ResetPasswordTemplate {
        current_user: None,
        error: query.error,
        token,
    }
}

/// Handle reset password form submission.
#[instrument(skip(state, token, form))]
pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Form(form): Form<ResetPasswordForm>,
) -> Response {
    if form.password != form.password_confirm {
        return Redirect::to(&format!("/reset-password/{token}?error=password_mismatch"))
            .into_response();
    }

    let api = state.api().anonymous();
    match api.reset_password(&token, &form.password).await {
        Ok(_) => Redirect::to("/login?success=password_reset").into_response(),
        Err(e) => {
            tracing::warn!("Password reset failed: {e}");
            Redirect::to(&format!("/reset-password/{token}?error=reset_failed")).into_response()
        }
    }
}

// =============================================================================
// Logout Route
// =============================================================================

/// Handle logout.
///
/// Revokes the refresh token upstream (best effort), clears the stored
/// credentials, and destroys the session.
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

    Redirect::to("/").into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(email: &str, password: &str, confirm: &str) -> RegisterForm {
        RegisterForm {
            name: "Robin".to_owned(),
            email: email.to_owned(),
            password: password.to_owned(),
            password_confirm: confirm.to_owned(),
        }
    }

    #[test]
    fn test_registration_rejects_malformed_email() {
        let bad = form("not-an-address", "hunter2hunter2", "hunter2hunter2");
        assert_eq!(validate_registration(&bad).unwrap_err(), "email_invalid");
    }

    #[test]
    fn test_registration_rejects_password_problems() {
        let mismatch = form("robin@example.com", "hunter2hunter2", "different");
        assert_eq!(
            validate_registration(&mismatch).unwrap_err(),
            "password_mismatch"
        );

        let short = form("robin@example.com", "short", "short");
        assert_eq!(
            validate_registration(&short).unwrap_err(),
            "password_too_short"
        );
    }

    #[test]
    fn test_registration_trims_and_accepts_valid_input() {
        let ok = form("  robin@example.com ", "hunter2hunter2", "hunter2hunter2");
        assert_eq!(
            validate_registration(&ok).unwrap().as_str(),
            "robin@example.com"
        );
    }
}
