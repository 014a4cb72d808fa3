//! Admin dashboard.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use sabo_teens_core::stats::DashboardStats;

use super::super::{Layout, Nav};
use crate::error::Result;
use crate::filters;
use crate::gateway::RegistrationFilter;
use crate::middleware::RequireAdmin;
use crate::services::notifications::Notifications;
use crate::state::AppState;

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub layout: Layout,
    pub stats: DashboardStats,
}

/// Display headline figures, recent registrations and per-event counts.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    notifications: Notifications,
) -> Result<impl IntoResponse> {
    let gateway = state.gateway();
    let events_gateway = gateway.events();
    let registrations_gateway = gateway.registrations();
    let filter = RegistrationFilter::default();
    let (events, registrations) = tokio::try_join!(
        events_gateway.list(None),
        registrations_gateway.list(&filter, admin.access_token()),
    )?;

    let mut layout = Layout::new(&state, Some(&admin), &notifications, Nav::Admin).await;
    if registrations.is_degraded() {
        layout.note_degraded(&registrations);
    } else {
        layout.note_degraded(&events);
    }

    Ok(DashboardTemplate {
        layout,
        stats: DashboardStats::compute(events.data(), registrations.data()),
    })
}
