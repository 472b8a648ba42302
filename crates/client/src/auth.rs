//! Authentication endpoints and credential types.
//!
//! The API issues a pair of credentials at login: a short-lived access
//! token attached to every request as a bearer header, and a longer-lived
//! refresh token exchanged for a new access token when the old one
//! expires. Refresh-and-replay lives in [`ApiSession::execute`]; this
//! module owns the endpoint calls and the credential types.
//!
//! [`ApiSession::execute`]: crate::ApiSession

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::json;
use shutterbay_core::types::{Role, UserId};
use tracing::{instrument, warn};

use crate::error::ApiError;
use crate::http::{ApiClient, ApiSession, parse_response};

/// The access/refresh credential pair for a signed-in session.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived bearer credential.
    #[serde(rename = "token")]
    pub access_token: String,
    /// Long-lived credential exchanged for new access tokens.
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}

/// The signed-in user, as returned alongside the credential pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl Identity {
    /// Whether this user may enter the admin console.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

#[derive(Deserialize)]
struct LoginResponse {
    #[serde(flatten)]
    tokens: TokenPair,
    user: Identity,
}

#[derive(Deserialize)]
struct RefreshResponse {
    token: String,
}

#[derive(Deserialize)]
pub(crate) struct MessageResponse {
    pub(crate) message: String,
}

/// Exchange a refresh token for a new access token.
///
/// Deliberately a bare credential-less call: it must not recurse into the
/// session's own refresh logic.
pub(crate) async fn refresh_access_token(
    client: &ApiClient,
    refresh_token: &str,
) -> Result<String, ApiError> {
    let response = client
        .http()
        .post(client.endpoint("/auth/refresh"))
        .json(&json!({ "refreshToken": refresh_token }))
        .send()
        .await?;

    let body: RefreshResponse = parse_response(response).await?;
    Ok(body.token)
}

fn as_auth_error(err: ApiError) -> ApiError {
    match err {
        ApiError::Unauthorized(message) | ApiError::Validation(message) => {
            ApiError::Auth(message)
        }
        other => other,
    }
}

impl ApiSession {
    /// Register a new customer account.
    ///
    /// Returns the API's confirmation message; the account stays inactive
    /// until the emailed verification link is followed.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<String, ApiError> {
        let body: MessageResponse = self
            .post(
                "/auth/register",
                json!({ "name": name, "email": email, "password": password }),
            )
            .await
            .map_err(as_auth_error)?;
        Ok(body.message)
    }

    /// Sign in and install the returned credential pair on this session.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<Identity, ApiError> {
        let body: LoginResponse = self
            .post("/auth/login", json!({ "email": email, "password": password }))
            .await
            .map_err(as_auth_error)?;

        self.install_tokens(body.tokens).await;
        Ok(body.user)
    }

    /// Sign out: revoke the refresh token upstream and drop local credentials.
    ///
    /// Upstream revocation failures are logged and swallowed; the local
    /// sign-out always succeeds.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        if let Some(pair) = self.tokens().await {
            let result: Result<MessageResponse, ApiError> = self
                .post("/auth/logout", json!({ "refreshToken": pair.refresh_token }))
                .await;
            if let Err(err) = result {
                warn!(error = %err, "Failed to revoke refresh token on logout");
            }
        }
        self.clear_tokens().await;
    }

    /// Activate an account via an emailed verification token.
    #[instrument(skip(self, token))]
    pub async fn verify_email(&self, token: &str) -> Result<String, ApiError> {
        let body: MessageResponse = self.get(&format!("/auth/verify/{token}")).await?;
        Ok(body.message)
    }

    /// Start a password reset; the API emails a reset link.
    ///
    /// The API answers with the same message whether or not the address
    /// exists, so this cannot be used to probe for accounts.
    #[instrument(skip(self))]
    pub async fn request_password_reset(&self, email: &str) -> Result<String, ApiError> {
        let body: MessageResponse = self
            .post("/auth/request-password-reset", json!({ "email": email }))
            .await?;
        Ok(body.message)
    }

    /// Complete a password reset with the emailed token.
    #[instrument(skip(self, token, password))]
    pub async fn reset_password(&self, token: &str, password: &str) -> Result<String, ApiError> {
        let body: MessageResponse = self
            .post(
                &format!("/auth/reset-password/{token}"),
                json!({ "password": password }),
            )
            .await
            .map_err(as_auth_error)?;
        Ok(body.message)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_token_pair_debug_redacts_credentials() {
        let pair = TokenPair {
            access_token: "very-secret-access".to_owned(),
            refresh_token: "very-secret-refresh".to_owned(),
        };
        let output = format!("{pair:?}");
        assert!(!output.contains("very-secret"));
        assert!(output.contains("[REDACTED]"));
    }

    #[test]
    fn test_login_response_parses_flat_token_fields() {
        let body: LoginResponse = serde_json::from_str(
            r#"{
                "token": "acc",
                "refreshToken": "ref",
                "user": {"id": "u1", "name": "Ada", "email": "ada@example.com", "role": "customer"}
            }"#,
        )
        .unwrap();

        assert_eq!(body.tokens.access_token, "acc");
        assert_eq!(body.tokens.refresh_token, "ref");
        assert_eq!(body.user.role, Role::Customer);
        assert!(!body.user.is_admin());
    }

    #[test]
    fn test_auth_error_mapping_keeps_other_variants() {
        assert!(matches!(
            as_auth_error(ApiError::Unauthorized("bad credentials".into())),
            ApiError::Auth(_)
        ));
        assert!(matches!(
            as_auth_error(ApiError::SessionExpired),
            ApiError::SessionExpired
        ));
    }
}
