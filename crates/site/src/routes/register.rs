//! Event registration pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use sabo_teens_core::{Event, EventId, EventStatus, FieldErrors, listing::sort_by_date};

use super::{DEGRADED_MESSAGE, Layout, Nav, SelectOption, events::NOT_FOUND_MESSAGE};
use crate::error::Result;
use crate::filters;
use crate::gateway::GatewayError;
use crate::middleware::RequireAuth;
use crate::models::CurrentUser;
use crate::services::notifications::{NotificationKind, Notifications};
use crate::services::registration::{
    FAILED_MESSAGE, RegistrationForm, SUBMITTED_MESSAGE, SubmissionState, submit as submit_registration,
};
use crate::state::AppState;

/// Registration form template.
#[derive(Template, WebTemplate)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub layout: Layout,
    /// Event named in the URL, shown as "Registering for".
    pub event: Option<Event>,
    /// Upcoming events offered in the selector when no event is named.
    pub choices: Vec<SelectOption>,
    pub form: RegistrationForm,
    pub errors: FieldErrors,
    pub action: String,
}

/// Display the registration form with an event selector.
pub async fn form(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    notifications: Notifications,
) -> Result<Response> {
    let form = prefilled(&user);
    render(&state, &user, &notifications, None, form, FieldErrors::new()).await
}

/// Display the registration form for one event.
#[instrument(skip(state, user, notifications), fields(event_id = %event_id))]
pub async fn form_for_event(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    notifications: Notifications,
    Path(event_id): Path<String>,
) -> Result<Response> {
    let event_id = EventId::new(event_id);
    let form = prefilled(&user);
    render(&state, &user, &notifications, Some(&event_id), form, FieldErrors::new()).await
}

/// Handle a registration with the event chosen in the form.
pub async fn submit(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    notifications: Notifications,
    Form(form): Form<RegistrationForm>,
) -> Result<Response> {
    handle(&state, &user, &notifications, None, form).await
}

/// Handle a registration for the event named in the URL.
#[instrument(skip(state, user, notifications, form), fields(event_id = %event_id))]
pub async fn submit_for_event(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    notifications: Notifications,
    Path(event_id): Path<String>,
    Form(form): Form<RegistrationForm>,
) -> Result<Response> {
    let event_id = EventId::new(event_id);
    handle(&state, &user, &notifications, Some(&event_id), form).await
}

async fn handle(
    state: &AppState,
    user: &CurrentUser,
    notifications: &Notifications,
    route_event: Option<&EventId>,
    form: RegistrationForm,
) -> Result<Response> {
    let outcome = submit_registration(
        state.gateway(),
        &form,
        route_event,
        user.id(),
        user.access_token(),
    )
    .await;

    match outcome {
        SubmissionState::Succeeded(_) => {
            notifications.success(SUBMITTED_MESSAGE).await;
            Ok(Redirect::to("/events").into_response())
        }
        SubmissionState::Failed(_) => {
            notifications.error(FAILED_MESSAGE).await;
            render(state, user, notifications, route_event, form, FieldErrors::new()).await
        }
        SubmissionState::Invalid(errors) => {
            render(state, user, notifications, route_event, form, errors).await
        }
        SubmissionState::Idle => {
            render(state, user, notifications, route_event, form, FieldErrors::new()).await
        }
    }
}

/// Render the form, loading either the named event or the selector list.
async fn render(
    state: &AppState,
    user: &CurrentUser,
    notifications: &Notifications,
    route_event: Option<&EventId>,
    form: RegistrationForm,
    errors: FieldErrors,
) -> Result<Response> {
    let events = state.gateway().events();

    let (event, choices, degraded) = match route_event {
        Some(id) => match events.get(id).await {
            Ok(fetched) => {
                let degraded = fetched.is_degraded();
                (Some(fetched.into_inner()), Vec::new(), degraded)
            }
            Err(GatewayError::NotFound(_)) => {
                notifications.error(NOT_FOUND_MESSAGE).await;
                return Ok(Redirect::to("/events").into_response());
            }
            Err(e) => return Err(e.into()),
        },
        None => {
            let fetched = events.list(Some(EventStatus::Upcoming)).await?;
            let degraded = fetched.is_degraded();
            let mut list = fetched.into_inner();
            sort_by_date(&mut list);
            let choices = list
                .iter()
                .map(|event| {
                    let label = format!("{} ({})", event.title, event.event_date.format("%b %-d, %Y"));
                    SelectOption::new(event.id.as_str(), label, form.event_id.trim())
                })
                .collect();
            (None, choices, degraded)
        }
    };

    let mut layout = Layout::new(state, Some(user), notifications, Nav::Register).await;
    if degraded {
        layout.notify(NotificationKind::Warning, DEGRADED_MESSAGE);
    }

    let action = match route_event {
        Some(id) => format!("/register/{id}"),
        None => "/register".to_string(),
    };

    Ok(RegisterTemplate {
        layout,
        event,
        choices,
        form,
        errors,
        action,
    }
    .into_response())
}

/// A blank form with the registrant's name taken from the profile.
fn prefilled(user: &CurrentUser) -> RegistrationForm {
    RegistrationForm {
        full_name: user.profile.full_name.clone().unwrap_or_default(),
        ..RegistrationForm::default()
    }
}
