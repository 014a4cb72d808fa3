//! Admin event management.
//!
//! Every write redirects back to the list, which is re-fetched in full.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use sabo_teens_core::{Event, EventId, EventStatus, Fetched, FieldErrors};

use super::super::{Layout, Nav, SelectOption, events::NOT_FOUND_MESSAGE};
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::gateway::GatewayError;
use crate::middleware::RequireAdmin;
use crate::models::CurrentUser;
use crate::services::event_authoring::{
    CREATED_MESSAGE, DELETE_FAILED_MESSAGE, DELETED_MESSAGE, EventForm, SAVE_FAILED_MESSAGE,
    UPDATED_MESSAGE,
};
use crate::services::notifications::Notifications;
use crate::state::AppState;

const LIST_PATH: &str = "/admin/events";

/// Delete confirmation form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DeleteForm {
    pub confirm: String,
}

impl DeleteForm {
    fn confirmed(&self) -> bool {
        self.confirm == "yes"
    }
}

/// Admin event list template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/events.html")]
pub struct EventListTemplate {
    pub layout: Layout,
    pub events: Vec<Event>,
}

/// Create/edit form template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/event_form.html")]
pub struct EventFormTemplate {
    pub layout: Layout,
    pub heading: &'static str,
    pub action: String,
    pub form: EventForm,
    pub errors: FieldErrors,
    pub statuses: Vec<SelectOption>,
}

/// Delete confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/delete_event.html")]
pub struct DeleteEventTemplate {
    pub layout: Layout,
    pub event: Event,
}

/// List every event.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    notifications: Notifications,
) -> Result<impl IntoResponse> {
    let fetched = state.gateway().events().list(None).await?;

    let mut layout = Layout::new(&state, Some(&admin), &notifications, Nav::Admin).await;
    layout.note_degraded(&fetched);

    Ok(EventListTemplate {
        layout,
        events: fetched.into_inner(),
    })
}

/// Display the blank create form.
pub async fn new_page(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    notifications: Notifications,
) -> impl IntoResponse {
    form_page(&state, &admin, &notifications, None, EventForm::default(), FieldErrors::new()).await
}

/// Handle the create form.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    notifications: Notifications,
    Form(form): Form<EventForm>,
) -> Response {
    let draft = match form.validate(Some(admin.id().clone())) {
        Ok(draft) => draft,
        Err(errors) => {
            return form_page(&state, &admin, &notifications, None, form, errors)
                .await
                .into_response();
        }
    };

    add_breadcrumb("admin", "Creating event", Some(&[("title", draft.title.as_str())]));
    let result = state
        .gateway()
        .events()
        .create(&draft, admin.access_token())
        .await;
    report(&notifications, result, CREATED_MESSAGE, SAVE_FAILED_MESSAGE).await;
    Redirect::to(LIST_PATH).into_response()
}

/// Display the edit form for one event.
#[instrument(skip(state, admin, notifications), fields(event_id = %id))]
pub async fn edit_page(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    notifications: Notifications,
    Path(id): Path<String>,
) -> Result<Response> {
    let id = EventId::new(id);
    let Some(event) = load(&state, &notifications, &id).await? else {
        return Ok(Redirect::to(LIST_PATH).into_response());
    };

    let form = EventForm::from_event(&event);
    Ok(
        form_page(&state, &admin, &notifications, Some(&id), form, FieldErrors::new())
            .await
            .into_response(),
    )
}

/// Handle the edit form.
#[instrument(skip(state, admin, notifications, form), fields(event_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    notifications: Notifications,
    Path(id): Path<String>,
    Form(form): Form<EventForm>,
) -> Response {
    let id = EventId::new(id);
    let draft = match form.validate(None) {
        Ok(draft) => draft,
        Err(errors) => {
            return form_page(&state, &admin, &notifications, Some(&id), form, errors)
                .await
                .into_response();
        }
    };

    let result = state
        .gateway()
        .events()
        .update(&id, &draft, admin.access_token())
        .await;
    report(&notifications, result, UPDATED_MESSAGE, SAVE_FAILED_MESSAGE).await;
    Redirect::to(LIST_PATH).into_response()
}

/// Display the delete confirmation page.
#[instrument(skip(state, admin, notifications), fields(event_id = %id))]
pub async fn delete_page(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    notifications: Notifications,
    Path(id): Path<String>,
) -> Result<Response> {
    let id = EventId::new(id);
    let Some(event) = load(&state, &notifications, &id).await? else {
        return Ok(Redirect::to(LIST_PATH).into_response());
    };

    Ok(DeleteEventTemplate {
        layout: Layout::new(&state, Some(&admin), &notifications, Nav::Admin).await,
        event,
    }
    .into_response())
}

/// Delete an event once `confirm=yes` is posted.
#[instrument(skip(state, admin, notifications, form), fields(event_id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    notifications: Notifications,
    Path(id): Path<String>,
    Form(form): Form<DeleteForm>,
) -> Redirect {
    if !form.confirmed() {
        tracing::debug!("Delete not confirmed");
        return Redirect::to(LIST_PATH);
    }

    let id = EventId::new(id);
    add_breadcrumb("admin", "Deleting event", Some(&[("event_id", id.as_str())]));
    let result = state
        .gateway()
        .events()
        .delete(&id, admin.access_token())
        .await;
    report(&notifications, result, DELETED_MESSAGE, DELETE_FAILED_MESSAGE).await;
    Redirect::to(LIST_PATH)
}

/// Fetch an event for editing; `None` after notifying when it is missing.
async fn load(
    state: &AppState,
    notifications: &Notifications,
    id: &EventId,
) -> Result<Option<Event>> {
    match state.gateway().events().get(id).await {
        Ok(fetched) => Ok(Some(fetched.into_inner())),
        Err(GatewayError::NotFound(_)) => {
            notifications.error(NOT_FOUND_MESSAGE).await;
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

async fn form_page(
    state: &AppState,
    admin: &CurrentUser,
    notifications: &Notifications,
    editing: Option<&EventId>,
    form: EventForm,
    errors: FieldErrors,
) -> EventFormTemplate {
    let (heading, action) = match editing {
        Some(id) => ("Edit Event", format!("{LIST_PATH}/{id}/edit")),
        None => ("Create Event", format!("{LIST_PATH}/new")),
    };

    let statuses = EventStatus::ALL
        .iter()
        .map(|status| SelectOption::new(status.as_str(), status.label(), form.status.trim()))
        .collect();

    EventFormTemplate {
        layout: Layout::new(state, Some(admin), notifications, Nav::Admin).await,
        heading,
        action,
        form,
        errors,
        statuses,
    }
}

/// Notify the outcome of a write. Only a live write counts as success.
async fn report<T>(
    notifications: &Notifications,
    result: std::result::Result<Fetched<T>, GatewayError>,
    succeeded: &str,
    failed: &str,
) {
    match result {
        Ok(Fetched::Live(_)) => notifications.success(succeeded).await,
        Ok(Fetched::Degraded { reason, .. }) => {
            tracing::warn!(reason = %reason, "Event write only applied optimistically");
            notifications.error(failed).await;
        }
        Err(e) => {
            tracing::error!(error = %e, "Event write failed");
            notifications.error(failed).await;
        }
    }
}
