//! Account page: profile and the user's own registrations.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tracing::instrument;

use sabo_teens_core::{ProfileUpdate, RegistrationRecord};

use super::{Layout, Nav};
use crate::error::Result;
use crate::filters;
use crate::gateway::RegistrationFilter;
use crate::middleware::RequireAuth;
use crate::services::auth::SessionManager;
use crate::services::notifications::Notifications;
use crate::state::AppState;

/// Profile update form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProfileForm {
    pub full_name: String,
}

/// Account page template.
#[derive(Template, WebTemplate)]
#[template(path = "account.html")]
pub struct AccountTemplate {
    pub layout: Layout,
    pub full_name: String,
    pub email: String,
    pub role: String,
    pub registrations: Vec<RegistrationRecord>,
}

/// Display the account page.
#[instrument(skip_all, fields(user_id = %user.id()))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    notifications: Notifications,
) -> Result<impl IntoResponse> {
    let fetched = state
        .gateway()
        .registrations()
        .list(
            &RegistrationFilter::for_user(user.id().clone()),
            user.access_token(),
        )
        .await?;

    let mut layout = Layout::new(&state, Some(&user), &notifications, Nav::Account).await;
    layout.note_degraded(&fetched);

    Ok(AccountTemplate {
        layout,
        full_name: user.profile.full_name.clone().unwrap_or_default(),
        email: user.profile.email.to_string(),
        role: user.profile.role.to_string(),
        registrations: fetched.into_inner(),
    })
}

/// Handle profile update.
#[instrument(skip_all)]
pub async fn update_profile(
    RequireAuth(_user): RequireAuth,
    auth: SessionManager,
    notifications: Notifications,
    Form(form): Form<ProfileForm>,
) -> Redirect {
    let full_name = form.full_name.trim();
    if full_name.is_empty() {
        notifications.error("Full name is required").await;
        return Redirect::to("/account");
    }

    let update = ProfileUpdate {
        full_name: Some(full_name.to_string()),
    };
    match auth.update_profile(update).await {
        Ok(_) => notifications.success("Profile updated").await,
        Err(e) => {
            tracing::warn!(error = %e, "Profile update failed");
            notifications.error(e.user_message()).await;
        }
    }
    Redirect::to("/account")
}
