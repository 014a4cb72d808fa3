//! Authentication extractors.
//!
//! Every extractor resolves the signed-in user through [`SessionManager`], so
//! token refresh and profile re-resolution happen before the handler runs.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::CurrentUser;
use crate::services::auth::SessionManager;
use crate::services::notifications::Notifications;
use crate::state::AppState;

/// Shown when a non-admin opens an admin page.
pub const ADMIN_ONLY_MESSAGE: &str = "You do not have permission to access that page";

/// Why an auth extractor refused the request.
#[derive(Debug)]
pub enum AuthRejection {
    /// Not signed in; go to the login page.
    RedirectToLogin,
    /// Signed in without the admin role; go home.
    RedirectHome,
    /// The session layer is missing from the stack.
    MissingSession,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::RedirectHome => Redirect::to("/").into_response(),
            Self::MissingSession => {
                tracing::error!("Session layer missing from middleware stack");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

fn session_from_parts(parts: &Parts) -> Result<Session, AuthRejection> {
    parts
        .extensions
        .get::<Session>()
        .cloned()
        .ok_or(AuthRejection::MissingSession)
}

impl FromRequestParts<AppState> for SessionManager {
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session = session_from_parts(parts)?;
        Ok(Self::new(session, state))
    }
}

impl<S> FromRequestParts<S> for Notifications
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::new(session_from_parts(parts)?))
    }
}

/// Resolve the current user; auth failures are reported as a notification
/// and treated as signed out.
async fn resolve(parts: &Parts, state: &AppState) -> Result<Option<CurrentUser>, AuthRejection> {
    let session = session_from_parts(parts)?;
    let manager = SessionManager::new(session.clone(), state);
    match manager.current().await {
        Ok(user) => Ok(user),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to restore auth session");
            Notifications::new(session).error(e.user_message()).await;
            Ok(None)
        }
    }
}

/// Extractor that optionally gets the current user.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(OptionalAuth(user): OptionalAuth) -> impl IntoResponse {
///     match user {
///         Some(u) => format!("Hello, {}!", u.profile.display_name()),
///         None => "Hello, guest!".to_string(),
///     }
/// }
/// ```
pub struct OptionalAuth(pub Option<CurrentUser>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(Self(resolve(parts, state).await?))
    }
}

/// Extractor that requires a signed-in user.
///
/// Redirects to `/login` when nobody is signed in.
pub struct RequireAuth(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        resolve(parts, state)
            .await?
            .map(Self)
            .ok_or(AuthRejection::RedirectToLogin)
    }
}

/// Extractor that requires a signed-in admin.
///
/// Redirects to `/login` when nobody is signed in, and home with an error
/// notification when the profile is not an admin.
pub struct RequireAdmin(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = resolve(parts, state)
            .await?
            .ok_or(AuthRejection::RedirectToLogin)?;

        if !user.is_admin() {
            tracing::warn!(user_id = %user.id(), path = %parts.uri.path(), "Non-admin denied");
            Notifications::new(session_from_parts(parts)?)
                .error(ADMIN_ONLY_MESSAGE)
                .await;
            return Err(AuthRejection::RedirectHome);
        }

        Ok(Self(user))
    }
}
