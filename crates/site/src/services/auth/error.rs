//! Authentication error types.

use thiserror::Error;

use crate::gateway::GatewayError;
use crate::supabase::SupabaseError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] sabo_teens_core::EmailError),

    /// Wrong email or password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// An account with this email already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password rejected by the backend.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// No signed-in user.
    #[error("not signed in")]
    NotSignedIn,

    /// The refresh grant failed; the session was cleared.
    #[error("session expired")]
    SessionExpired,

    /// The profile lookup failed for a reason other than a missing row.
    #[error("profile lookup failed: {0}")]
    ProfileLookup(#[source] GatewayError),

    /// A profile write failed.
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// An auth endpoint failed.
    #[error("auth backend error: {0}")]
    Backend(SupabaseError),

    /// The session store failed.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl AuthError {
    /// Classify an auth endpoint failure.
    #[must_use]
    pub fn from_backend(err: SupabaseError) -> Self {
        let message = err.message();
        match err.code() {
            Some("invalid_grant" | "invalid_credentials") => Self::InvalidCredentials,
            Some("user_already_exists" | "email_exists") => Self::UserAlreadyExists,
            Some("weak_password") => Self::WeakPassword(message),
            _ if message.contains("already registered") => Self::UserAlreadyExists,
            _ => Self::Backend(err),
        }
    }

    /// Message safe to show the visitor.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidEmail(_) => "Invalid email address".to_string(),
            Self::InvalidCredentials => "Invalid email or password".to_string(),
            Self::UserAlreadyExists => "An account with this email already exists".to_string(),
            Self::WeakPassword(msg) => msg.clone(),
            Self::NotSignedIn => "Please sign in to continue".to_string(),
            Self::SessionExpired => "Your session has expired. Please sign in again.".to_string(),
            Self::ProfileLookup(_) => "We couldn't load your profile. Please try again.".to_string(),
            Self::Gateway(_) | Self::Backend(_) | Self::Session(_) => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }
}
