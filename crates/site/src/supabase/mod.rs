//! Hosted backend client (Supabase).
//!
//! # Architecture
//!
//! - `PostgREST` for tables under `/rest/v1/<table>` ([`TableQuery`])
//! - `GoTrue` for auth under `/auth/v1/...` (see [`auth`])
//! - Every request carries `apikey: <anon key>`; `Authorization` is the
//!   signed-in user's access token when one is supplied, the anon key
//!   otherwise
//!
//! # Example
//!
//! ```rust,ignore
//! let client = SupabaseClient::new(&config);
//!
//! let events: Vec<Event> = client
//!     .table("events")
//!     .select("*")
//!     .eq("status", "upcoming")
//!     .order("event_date", true)
//!     .fetch()
//!     .await?;
//! ```

pub mod auth;
mod rest;

pub use auth::{AuthUser, SignUpResponse, TokenGrant};
pub use rest::TableQuery;

use std::sync::Arc;

use reqwest::Response;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::SupabaseConfig;

/// `PostgREST` error code for "no rows" on a single-object read.
pub const NOT_FOUND_CODE: &str = "PGRST116";

/// Errors that can occur when talking to the hosted backend.
#[derive(Debug, Error)]
pub enum SupabaseError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl SupabaseError {
    /// Whether this is the "no rows" result of a single-object read.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { code: Some(code), .. } if code == NOT_FOUND_CODE)
    }

    /// Machine-readable error code, if the backend sent one.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// HTTP status, if the backend answered.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Parse(_) => None,
        }
    }

    /// Human-readable message from the backend, or the error's display form.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Client for the hosted backend.
///
/// Cheaply cloneable; the HTTP connection pool is shared.
#[derive(Clone)]
pub struct SupabaseClient {
    inner: Arc<SupabaseClientInner>,
}

struct SupabaseClientInner {
    http: reqwest::Client,
    base_url: String,
    anon_key: SecretString,
}

impl std::fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

impl SupabaseClient {
    /// Create a new client.
    #[must_use]
    pub fn new(config: &SupabaseConfig) -> Self {
        Self {
            inner: Arc::new(SupabaseClientInner {
                http: reqwest::Client::new(),
                base_url: config.url.as_str().trim_end_matches('/').to_string(),
                anon_key: config.anon_key.clone(),
            }),
        }
    }

    /// Start a query against `table`.
    #[must_use]
    pub fn table(&self, table: &'static str) -> TableQuery<'_> {
        TableQuery::new(self, table)
    }

    pub(crate) fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.inner.base_url)
    }

    pub(crate) fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.inner.base_url)
    }

    /// Build a request with the `apikey` and `Authorization` headers set.
    pub(crate) fn request(
        &self,
        method: reqwest::Method,
        url: &str,
        bearer: Option<&str>,
    ) -> reqwest::RequestBuilder {
        let anon_key = self.inner.anon_key.expose_secret();
        self.inner
            .http
            .request(method, url)
            .header("apikey", anon_key)
            .bearer_auth(bearer.unwrap_or(anon_key))
    }
}

/// Error body shapes from `PostgREST` and `GoTrue`.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<serde_json::Value>,
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

fn api_error(status: reqwest::StatusCode, body: &str) -> SupabaseError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();

    let code = parsed
        .error_code
        .or_else(|| match parsed.code {
            Some(serde_json::Value::String(code)) => Some(code),
            _ => None,
        })
        .or_else(|| parsed.error.clone());

    let message = parsed
        .message
        .or(parsed.msg)
        .or(parsed.error_description)
        .or(parsed.error)
        .unwrap_or_else(|| body.chars().take(200).collect());

    SupabaseError::Api {
        status: status.as_u16(),
        code,
        message,
    }
}

/// Read a response body, mapping non-success statuses to [`SupabaseError::Api`].
async fn read_text(response: Response) -> Result<String, SupabaseError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        tracing::debug!(
            status = %status,
            body = %body.chars().take(500).collect::<String>(),
            "Backend returned non-success status"
        );
        return Err(api_error(status, &body));
    }

    Ok(body)
}

/// Read and parse a JSON response body.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, SupabaseError> {
    let body = read_text(response).await?;
    serde_json::from_str(&body).map_err(|e| {
        tracing::error!(
            error = %e,
            body = %body.chars().take(500).collect::<String>(),
            "Failed to parse backend response"
        );
        SupabaseError::Parse(e)
    })
}
