//! Authentication route handlers.
//!
//! Handles sign-in, sign-up, password reset and sign-out against the hosted
//! auth service through [`SessionManager`].

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use sabo_teens_core::{Email, FieldErrors};

use super::{Layout, Nav};
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::services::auth::{AuthError, SessionManager, SignUpOutcome};
use crate::services::notifications::Notifications;
use crate::state::AppState;

/// Minimum password length accepted by the sign-up form.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Minimum full name length accepted by the sign-up form.
pub const MIN_NAME_LENGTH: usize = 2;

pub const DEMO_SESSION_MESSAGE: &str =
    "The account service is not configured, so you are signed in with a demo account.";

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        validate_email(&mut errors, &self.email);
        errors.require("password", &self.password, "Password is required");
        errors
    }
}

/// Sign-up form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignupForm {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub terms: Option<String>,
}

impl SignupForm {
    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        let full_name = self.full_name.trim();
        if full_name.is_empty() {
            errors.add("full_name", "Full name is required");
        } else if full_name.chars().count() < MIN_NAME_LENGTH {
            errors.add("full_name", "Full name must be at least 2 characters");
        }

        validate_email(&mut errors, &self.email);

        if self.password.is_empty() {
            errors.add("password", "Password is required");
        } else if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            errors.add("password", "Password must be at least 6 characters");
        }

        if self.confirm_password.is_empty() {
            errors.add("confirm_password", "Please confirm your password");
        } else if self.confirm_password != self.password {
            errors.add("confirm_password", "Passwords do not match");
        }

        if self.terms.is_none() {
            errors.add("terms", "You must accept the terms and conditions");
        }

        errors
    }
}

/// Forgot password form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ForgotPasswordForm {
    pub email: String,
}

fn validate_email(errors: &mut FieldErrors, value: &str) {
    if value.trim().is_empty() {
        errors.add("email", "Email is required");
    } else if Email::parse(value).is_err() {
        errors.add("email", "Invalid email address");
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub layout: Layout,
    pub email: String,
    pub errors: FieldErrors,
}

/// Sign-up page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub layout: Layout,
    pub full_name: String,
    pub email: String,
    pub errors: FieldErrors,
}

/// Forgot password page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/forgot_password.html")]
pub struct ForgotPasswordTemplate {
    pub layout: Layout,
    pub email: String,
    pub sent: bool,
    pub errors: FieldErrors,
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    notifications: Notifications,
) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }
    LoginTemplate {
        layout: Layout::new(&state, None, &notifications, Nav::Auth).await,
        email: String::new(),
        errors: FieldErrors::new(),
    }
    .into_response()
}

/// Handle login form submission.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    auth: SessionManager,
    notifications: Notifications,
    Form(form): Form<LoginForm>,
) -> Response {
    let errors = form.validate();
    if errors.is_empty() {
        match auth.sign_in(&form.email, &form.password).await {
            Ok(user) => {
                if user.session.demo {
                    notifications.warning(DEMO_SESSION_MESSAGE).await;
                }
                notifications
                    .success(format!("Welcome back, {}!", user.profile.display_name()))
                    .await;
                return Redirect::to("/").into_response();
            }
            Err(e) => {
                tracing::warn!(error = %e, "Login failed");
                notifications.error(e.user_message()).await;
            }
        }
    }

    LoginTemplate {
        layout: Layout::new(&state, None, &notifications, Nav::Auth).await,
        email: form.email,
        errors,
    }
    .into_response()
}

// =============================================================================
// Sign-up Routes
// =============================================================================

/// Display the sign-up page.
pub async fn signup_page(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    notifications: Notifications,
) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }
    SignupTemplate {
        layout: Layout::new(&state, None, &notifications, Nav::Auth).await,
        full_name: String::new(),
        email: String::new(),
        errors: FieldErrors::new(),
    }
    .into_response()
}

/// Handle sign-up form submission.
#[instrument(skip_all)]
pub async fn signup(
    State(state): State<AppState>,
    auth: SessionManager,
    notifications: Notifications,
    Form(form): Form<SignupForm>,
) -> Response {
    let errors = form.validate();
    if errors.is_empty() {
        match auth
            .sign_up(&form.email, &form.password, &form.full_name)
            .await
        {
            Ok(SignUpOutcome::SignedIn(user)) => {
                if user.session.demo {
                    notifications.warning(DEMO_SESSION_MESSAGE).await;
                }
                notifications.success("Account created successfully!").await;
                return Redirect::to("/").into_response();
            }
            Ok(SignUpOutcome::ConfirmationRequired) => {
                notifications
                    .info("Check your email to confirm your account, then sign in.")
                    .await;
                return Redirect::to("/login").into_response();
            }
            Err(e) => {
                tracing::warn!(error = %e, "Sign-up failed");
                let message = match e {
                    AuthError::InvalidEmail(_)
                    | AuthError::UserAlreadyExists
                    | AuthError::WeakPassword(_) => e.user_message(),
                    _ => "Failed to create account. Please try again.".to_string(),
                };
                notifications.error(message).await;
            }
        }
    }

    SignupTemplate {
        layout: Layout::new(&state, None, &notifications, Nav::Auth).await,
        full_name: form.full_name,
        email: form.email,
        errors,
    }
    .into_response()
}

// =============================================================================
// Password Reset Routes
// =============================================================================

/// Display the forgot password page.
pub async fn forgot_password_page(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    notifications: Notifications,
) -> impl IntoResponse {
    ForgotPasswordTemplate {
        layout: Layout::new(&state, user.as_ref(), &notifications, Nav::Auth).await,
        email: String::new(),
        sent: false,
        errors: FieldErrors::new(),
    }
}

/// Handle forgot password form submission.
#[instrument(skip_all)]
pub async fn forgot_password(
    State(state): State<AppState>,
    auth: SessionManager,
    notifications: Notifications,
    Form(form): Form<ForgotPasswordForm>,
) -> impl IntoResponse {
    let mut errors = FieldErrors::new();
    validate_email(&mut errors, &form.email);

    let mut sent = false;
    if errors.is_empty() {
        match auth.reset_password(&form.email).await {
            Ok(()) => {
                sent = true;
                notifications
                    .success("Password reset email sent! Check your inbox.")
                    .await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Password reset failed");
                notifications
                    .error("Failed to send reset email. Please try again.")
                    .await;
            }
        }
    }

    ForgotPasswordTemplate {
        layout: Layout::new(&state, None, &notifications, Nav::Auth).await,
        email: form.email,
        sent,
        errors,
    }
}

// =============================================================================
// Logout
// =============================================================================

/// Handle logout.
///
/// The local session is always cleared; see [`SessionManager::sign_out`].
#[instrument(skip_all)]
pub async fn logout(auth: SessionManager, notifications: Notifications) -> Redirect {
    if let Err(e) = auth.sign_out().await {
        tracing::error!(error = %e, "Failed to clear session");
    }
    notifications.info("You have been signed out.").await;
    Redirect::to("/")
}
