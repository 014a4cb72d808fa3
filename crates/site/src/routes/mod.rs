//! HTTP route handlers for the site.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                             - Home page
//! GET  /about                        - About the ministry
//! GET  /faq                          - FAQ with category filter and search
//! GET  /health                       - Health check
//!
//! # Events
//! GET  /events                       - Event catalog (?status=)
//! GET  /events/{id}                  - Event detail
//!
//! # Auth
//! GET  /login, POST /login           - Sign in
//! GET  /signup, POST /signup         - Create account
//! GET  /forgot-password, POST ...    - Password reset email
//! POST /logout                       - Sign out
//!
//! # Registration (requires auth)
//! GET  /register, POST /register
//! GET  /register/{event_id}, POST /register/{event_id}
//!
//! # Account (requires auth)
//! GET  /account                      - Profile and own registrations
//! POST /account/profile              - Update display name
//!
//! # Admin (requires admin role)
//! GET  /admin                        - Dashboard
//! GET  /admin/events                 - Event list
//! GET  /admin/events/new, POST       - Create event
//! GET  /admin/events/{id}/edit, POST - Edit event
//! GET  /admin/events/{id}/delete, POST - Confirm and delete event
//! GET  /admin/registrations          - Registration list (?search=&event=)
//! GET  /admin/registrations/export   - CSV download (?event=)
//! ```

pub mod account;
pub mod admin;
pub mod auth;
pub mod events;
pub mod faq;
pub mod home;
pub mod register;

use axum::{
    Router,
    routing::{get, post},
};
use sabo_teens_core::Fetched;

use crate::models::CurrentUser;
use crate::services::notifications::{Notification, NotificationKind, Notifications};
use crate::state::AppState;

/// Shown on pages rendered from fallback data.
pub const DEGRADED_MESSAGE: &str =
    "We couldn't reach the event service, so you're seeing sample data.";

/// Navigation section highlighted in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nav {
    Home,
    About,
    Events,
    Faq,
    Register,
    Account,
    Auth,
    Admin,
}

impl Nav {
    /// Key used by templates to mark the active link.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::About => "about",
            Self::Events => "events",
            Self::Faq => "faq",
            Self::Register => "register",
            Self::Account => "account",
            Self::Auth => "auth",
            Self::Admin => "admin",
        }
    }
}

/// One `<option>` of a select box, with its selection precomputed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>, current: &str) -> Self {
        let value = value.into();
        Self {
            selected: value == current,
            label: label.into(),
            value,
        }
    }
}

/// Data every page's base template needs.
#[derive(Debug, Clone)]
pub struct Layout {
    pub signed_in: bool,
    pub display_name: String,
    pub is_admin: bool,
    pub demo_session: bool,
    pub mock_mode: bool,
    pub notifications: Vec<Notification>,
    nav: Nav,
}

impl Layout {
    /// Build the layout, draining the session's pending notifications.
    pub async fn new(
        state: &AppState,
        user: Option<&CurrentUser>,
        notifications: &Notifications,
        nav: Nav,
    ) -> Self {
        Self {
            signed_in: user.is_some(),
            display_name: user
                .map(|u| u.profile.display_name().to_string())
                .unwrap_or_default(),
            is_admin: user.is_some_and(CurrentUser::is_admin),
            demo_session: user.is_some_and(|u| u.session.demo),
            mock_mode: state.is_mock_mode(),
            notifications: notifications.take().await,
            nav,
        }
    }

    /// Whether `section` is the current navigation key (template helper).
    #[must_use]
    pub fn is_active(&self, section: &str) -> bool {
        self.nav.key() == section
    }

    /// Add a notification rendered on this page only.
    pub fn notify(&mut self, kind: NotificationKind, message: impl Into<String>) {
        self.notifications.push(Notification {
            kind,
            message: message.into(),
        });
    }

    /// Warn the visitor when `fetched` is fallback data.
    pub fn note_degraded<T>(&mut self, fetched: &Fetched<T>) {
        if fetched.is_degraded() {
            self.notify(NotificationKind::Warning, DEGRADED_MESSAGE);
        }
    }
}

/// Health check.
pub async fn health() -> &'static str {
    "ok"
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/signup", get(auth::signup_page).post(auth::signup))
        .route(
            "/forgot-password",
            get(auth::forgot_password_page).post(auth::forgot_password),
        )
        .route("/logout", post(auth::logout))
}

/// Create the event routes router.
pub fn event_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(events::index))
        .route("/{id}", get(events::show))
}

/// Create the registration routes router.
pub fn register_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(register::form).post(register::submit))
        .route(
            "/{event_id}",
            get(register::form_for_event).post(register::submit_for_event),
        )
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::index))
        .route("/profile", post(account::update_profile))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(admin::dashboard::index))
        .route("/events", get(admin::events::index))
        .route(
            "/events/new",
            get(admin::events::new_page).post(admin::events::create),
        )
        .route(
            "/events/{id}/edit",
            get(admin::events::edit_page).post(admin::events::update),
        )
        .route(
            "/events/{id}/delete",
            get(admin::events::delete_page).post(admin::events::delete),
        )
        .route("/registrations", get(admin::registrations::index))
        .route("/registrations/export", get(admin::registrations::export))
}

/// Create all routes for the site.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/about", get(home::about))
        .route("/faq", get(faq::index))
        .route("/health", get(health))
        .nest("/events", event_routes())
        .nest("/register", register_routes())
        .nest("/account", account_routes())
        .nest("/admin", admin_routes())
        .merge(auth_routes())
}
