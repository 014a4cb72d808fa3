//! `GoTrue` auth endpoints.

use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use super::{SupabaseClient, SupabaseError, read_json, read_text};

/// The auth identity behind a session.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

/// Metadata supplied at sign-up.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserMetadata {
    #[serde(default)]
    pub full_name: Option<String>,
}

/// Tokens returned by the password and refresh grants.
///
/// Implements `Debug` manually to redact tokens.
#[derive(Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: String,
    /// Lifetime in seconds.
    pub expires_in: i64,
    /// Absolute expiry (unix seconds), when the server sends it.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: AuthUser,
}

impl std::fmt::Debug for TokenGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenGrant")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .field("expires_at", &self.expires_at)
            .field("user", &self.user)
            .finish()
    }
}

impl TokenGrant {
    /// Absolute expiry in unix seconds, computed from `expires_in` when the
    /// server omitted `expires_at`.
    #[must_use]
    pub fn expires_at_or(&self, now: i64) -> i64 {
        self.expires_at.unwrap_or(now + self.expires_in)
    }
}

/// Sign-up answers with a session when email confirmation is off, and with
/// the bare user when a confirmation email was sent.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SignUpResponse {
    Session(TokenGrant),
    ConfirmationSent(AuthUser),
}

impl SupabaseClient {
    /// `POST /auth/v1/signup`
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError` on transport failure or rejection.
    #[instrument(skip(self, password))]
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<SignUpResponse, SupabaseError> {
        let body = json!({
            "email": email,
            "password": password,
            "data": { "full_name": full_name },
        });
        let response = self
            .request(Method::POST, &self.auth_url("signup"), None)
            .json(&body)
            .send()
            .await?;
        read_json(response).await
    }

    /// `POST /auth/v1/token?grant_type=password`
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError` on transport failure or bad credentials.
    #[instrument(skip(self, password))]
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<TokenGrant, SupabaseError> {
        let response = self
            .request(Method::POST, &self.auth_url("token"), None)
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        read_json(response).await
    }

    /// `POST /auth/v1/token?grant_type=refresh_token`
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError` on transport failure or a revoked token.
    #[instrument(skip_all)]
    pub async fn refresh_session(&self, refresh_token: &str) -> Result<TokenGrant, SupabaseError> {
        let response = self
            .request(Method::POST, &self.auth_url("token"), None)
            .query(&[("grant_type", "refresh_token")])
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await?;
        read_json(response).await
    }

    /// `POST /auth/v1/logout`
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError` on transport failure or rejection.
    #[instrument(skip_all)]
    pub async fn sign_out(&self, access_token: &str) -> Result<(), SupabaseError> {
        let response = self
            .request(Method::POST, &self.auth_url("logout"), Some(access_token))
            .send()
            .await?;
        read_text(response).await.map(drop)
    }

    /// `POST /auth/v1/recover`
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError` on transport failure or rejection.
    #[instrument(skip(self))]
    pub async fn reset_password_for_email(&self, email: &str) -> Result<(), SupabaseError> {
        let response = self
            .request(Method::POST, &self.auth_url("recover"), None)
            .json(&json!({ "email": email }))
            .send()
            .await?;
        read_text(response).await.map(drop)
    }
}
