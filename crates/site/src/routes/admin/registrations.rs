//! Admin registration listing and CSV export.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;
use url::form_urlencoded;

use sabo_teens_core::{
    EventId, Fetched, RegistrationRecord,
    export::{export_filename, registrations_csv},
    listing::RegistrationSearch,
};

use super::super::{Layout, Nav, SelectOption};
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::gateway::RegistrationFilter;
use crate::middleware::RequireAdmin;
use crate::services::notifications::Notifications;
use crate::state::AppState;

pub const EXPORT_FAILED_MESSAGE: &str = "Failed to export registrations";

const LIST_PATH: &str = "/admin/registrations";

/// Query parameters for the listing.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub event: Option<String>,
}

/// Query parameters for the export.
#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    pub event: Option<String>,
}

/// Registration list template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/registrations.html")]
pub struct RegistrationsTemplate {
    pub layout: Layout,
    pub records: Vec<RegistrationRecord>,
    pub total: usize,
    pub events: Vec<SelectOption>,
    pub search: String,
    pub export_url: String,
}

/// List registrations filtered by `?search=` and `?event=`.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    notifications: Notifications,
    Query(query): Query<ListQuery>,
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
    layout.note_degraded(&registrations);

    let search = RegistrationSearch::new(query.search.as_deref(), query.event.as_deref());
    let all = registrations.data();
    let records = search.apply(all).into_iter().cloned().collect();

    let event = search.event_id().map(ToString::to_string).unwrap_or_default();
    let export_link = export_url(&event);

    Ok(RegistrationsTemplate {
        layout,
        records,
        total: all.len(),
        events: events
            .data()
            .iter()
            .map(|e| SelectOption::new(e.id.as_str(), e.title.as_str(), &event))
            .collect(),
        search: query.search.unwrap_or_default(),
        export_url: export_link,
    })
}

/// Link to the CSV export, scoped to `event` unless it is blank.
fn export_url(event: &str) -> String {
    if event.is_empty() {
        return format!("{LIST_PATH}/export");
    }
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("event", event)
        .finish();
    format!("{LIST_PATH}/export?{query}")
}

/// Download registrations as CSV, optionally for one event.
#[instrument(skip_all)]
pub async fn export(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    notifications: Notifications,
    Query(query): Query<ExportQuery>,
) -> Result<Response> {
    let event_id = query
        .event
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(EventId::from);

    add_breadcrumb(
        "admin",
        "Exporting registrations",
        Some(&[("event_id", event_id.as_ref().map_or("all", EventId::as_str))]),
    );

    let rows = match state
        .gateway()
        .registrations()
        .export(event_id.as_ref(), admin.access_token())
        .await
    {
        Ok(Fetched::Live(rows)) => rows,
        Ok(Fetched::Degraded { reason, .. }) => {
            tracing::warn!(reason = %reason, "Export unavailable");
            notifications.error(EXPORT_FAILED_MESSAGE).await;
            return Ok(Redirect::to(LIST_PATH).into_response());
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to export registrations");
            notifications.error(EXPORT_FAILED_MESSAGE).await;
            return Ok(Redirect::to(LIST_PATH).into_response());
        }
    };

    let csv = registrations_csv(&rows)?;
    let filename = export_filename(Utc::now().date_naive());
    tracing::info!(rows = rows.len(), filename = %filename, "Registrations exported");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        csv,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_url_encodes_event_id() {
        assert_eq!(export_url(""), "/admin/registrations/export");
        assert_eq!(export_url("42"), "/admin/registrations/export?event=42");
        assert_eq!(
            export_url("a&b=c d"),
            "/admin/registrations/export?event=a%26b%3Dc+d"
        );
    }
}
