//! Public event catalog.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use sabo_teens_core::{
    Event, EventId, Fetched,
    listing::{EventFilter, related_events, sort_by_date},
};

use super::{Layout, Nav};
use crate::error::Result;
use crate::filters;
use crate::gateway::GatewayError;
use crate::middleware::OptionalAuth;
use crate::services::notifications::Notifications;
use crate::state::AppState;

/// Related events shown under an event's details.
pub const RELATED_LIMIT: usize = 3;

/// Shown when an event id does not resolve.
pub const NOT_FOUND_MESSAGE: &str = "Event not found";

/// Query parameters for the catalog.
#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    pub status: Option<String>,
}

/// A status tab with its selection state precomputed.
pub struct Tab {
    pub key: &'static str,
    pub label: &'static str,
    pub active: bool,
}

/// Event catalog template.
#[derive(Template, WebTemplate)]
#[template(path = "events/index.html")]
pub struct EventsTemplate {
    pub layout: Layout,
    pub tabs: Vec<Tab>,
    pub events: Vec<Event>,
}

/// Event detail template.
#[derive(Template, WebTemplate)]
#[template(path = "events/show.html")]
pub struct EventTemplate {
    pub layout: Layout,
    pub event: Event,
    pub related: Vec<Event>,
}

/// Display the catalog, filtered in memory by `?status=`.
#[instrument(skip(state, user, notifications))]
pub async fn index(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    notifications: Notifications,
    Query(query): Query<CatalogQuery>,
) -> Result<impl IntoResponse> {
    let filter = EventFilter::from_query(query.status.as_deref());
    let fetched = state.gateway().events().list(None).await?;

    let mut layout = Layout::new(&state, user.as_ref(), &notifications, Nav::Events).await;
    layout.note_degraded(&fetched);

    let mut events = filter.apply(fetched.data());
    sort_by_date(&mut events);

    let tabs = EventFilter::TABS
        .iter()
        .map(|tab| Tab {
            key: tab.key(),
            label: tab.label(),
            active: *tab == filter,
        })
        .collect();

    Ok(EventsTemplate {
        layout,
        tabs,
        events,
    })
}

/// Display one event with related events of the same status.
#[instrument(skip(state, user, notifications), fields(event_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    notifications: Notifications,
    Path(id): Path<String>,
) -> Result<Response> {
    let id = EventId::new(id);
    let events = state.gateway().events();

    let fetched = match events.get(&id).await {
        Ok(fetched) => fetched,
        Err(GatewayError::NotFound(_)) => {
            notifications.error(NOT_FOUND_MESSAGE).await;
            return Ok(Redirect::to("/events").into_response());
        }
        Err(e) => return Err(e.into()),
    };

    let mut layout = Layout::new(&state, user.as_ref(), &notifications, Nav::Events).await;
    layout.note_degraded(&fetched);
    let event = fetched.into_inner();

    // Related events are decoration; a failure only hides them. Sample data
    // is never offered as related.
    let related = match events.list(Some(event.status)).await {
        Ok(Fetched::Live(mut list)) => {
            sort_by_date(&mut list);
            related_events(list, &event.id, RELATED_LIMIT)
        }
        Ok(Fetched::Degraded { .. }) => Vec::new(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load related events");
            Vec::new()
        }
    };

    Ok(EventTemplate {
        layout,
        event,
        related,
    }
    .into_response())
}
