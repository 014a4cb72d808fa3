//! Session-related types.
//!
//! Types stored in the server-side session for authentication state.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use sabo_teens_core::{Email, Profile, UserId};

/// Seconds before expiry at which an access token is refreshed.
const REFRESH_LEEWAY_SECONDS: i64 = 60;

/// The signed-in user's auth session.
///
/// Implements `Debug` manually to redact tokens.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token expiry (unix seconds).
    pub expires_at: i64,
    pub user_id: UserId,
    pub email: Email,
    /// Name supplied at sign-up, if any.
    #[serde(default)]
    pub full_name: Option<String>,
    /// Minted locally because the backend is not configured.
    #[serde(default)]
    pub demo: bool,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("full_name", &self.full_name)
            .field("demo", &self.demo)
            .finish()
    }
}

impl AuthSession {
    /// A local session for mock mode. Never expires, never refreshes.
    #[must_use]
    pub fn demo(email: Email, full_name: Option<&str>) -> Self {
        Self {
            access_token: String::new(),
            refresh_token: String::new(),
            expires_at: i64::MAX,
            user_id: UserId::new(format!("demo-{}", email.local_part())),
            email,
            full_name: full_name.map(str::to_string),
            demo: true,
        }
    }

    /// Whether the access token is expired or about to be.
    #[must_use]
    pub fn needs_refresh(&self) -> bool {
        !self.demo && Utc::now().timestamp() + REFRESH_LEEWAY_SECONDS >= self.expires_at
    }
}

/// What the session store holds for a signed-in browser.
///
/// The session and its profile are stored together so that signing out
/// clears both with one removal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredAuth {
    pub session: AuthSession,
    pub profile: Profile,
    /// Profile version this copy was resolved at.
    #[serde(default)]
    pub profile_version: u64,
}

/// A resolved user for the current request.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub session: AuthSession,
    pub profile: Profile,
}

impl CurrentUser {
    /// The user's id.
    #[must_use]
    pub const fn id(&self) -> &UserId {
        &self.session.user_id
    }

    /// Bearer token for backend writes.
    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.session.access_token
    }

    /// Whether the profile may use the admin dashboard.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.profile.is_admin()
    }
}

impl From<StoredAuth> for CurrentUser {
    fn from(stored: StoredAuth) -> Self {
        Self {
            session: stored.session,
            profile: stored.profile,
        }
    }
}

/// Session keys.
pub mod keys {
    /// Key for the signed-in user's [`super::StoredAuth`].
    pub const AUTH: &str = "auth";

    /// Key for the pending notification queue.
    pub const NOTIFICATIONS: &str = "notifications";
}
