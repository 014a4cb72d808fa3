//! Event registration form and submission.

use serde::Deserialize;
use tracing::instrument;

use sabo_teens_core::{
    Affiliation, Category, EventId, Fetched, FieldErrors, NewRegistration, Registrant, Registration, UserId,
};

use crate::error::add_breadcrumb;
use crate::gateway::Gateway;

pub const SUBMITTED_MESSAGE: &str = "Registration submitted successfully!";
pub const FAILED_MESSAGE: &str = "Failed to submit registration. Please try again.";

/// Posted registration form. Missing fields deserialize as empty strings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegistrationForm {
    pub event_id: String,
    pub full_name: String,
    pub residential_address: String,
    pub phone_number: String,
    pub category: String,
    pub school_class: String,
    pub industry: String,
    pub church: String,
    pub parent_full_name: String,
    pub parent_phone_number: String,
    pub parent_church: String,
    pub parent_occupation: String,
}

impl RegistrationForm {
    /// Whether the student field should be shown.
    #[must_use]
    pub fn is_student(&self) -> bool {
        self.category.trim() == Category::Student.as_str()
    }

    /// Whether the vocational field should be shown.
    #[must_use]
    pub fn is_vocational(&self) -> bool {
        self.category.trim() == Category::Vocational.as_str()
    }

    /// Validate and assemble the insert payload.
    ///
    /// `route_event` is the event named in the URL; without it the form's own
    /// `event_id` selection must be present.
    ///
    /// # Errors
    ///
    /// Returns every field-level problem found.
    pub fn validate(
        &self,
        route_event: Option<&EventId>,
        user_id: &UserId,
    ) -> Result<NewRegistration, FieldErrors> {
        let mut errors = FieldErrors::new();

        let event_id = route_event.cloned().or_else(|| {
            let selected = self.event_id.trim();
            (!selected.is_empty()).then(|| EventId::new(selected))
        });
        if event_id.is_none() {
            errors.add("event_id", "Please select an event");
        }

        errors.require("full_name", &self.full_name, "Full name is required");
        errors.require(
            "residential_address",
            &self.residential_address,
            "Residential address is required",
        );
        errors.require_phone("phone_number", &self.phone_number, "Phone number is required");

        let category = self.category.parse::<Category>().ok();
        if category.is_none() {
            errors.add("category", "Please select a category");
        }
        if category == Some(Category::Student) {
            errors.require(
                "school_class",
                &self.school_class,
                "School and class is required for students",
            );
        } else {
            errors.require("industry", &self.industry, "Industry/vocation is required");
        }

        errors.require("church", &self.church, "Church information is required");
        errors.require(
            "parent_full_name",
            &self.parent_full_name,
            "Parent's full name is required",
        );
        errors.require_phone(
            "parent_phone_number",
            &self.parent_phone_number,
            "Parent's phone number is required",
        );
        errors.require("parent_church", &self.parent_church, "Parent's church is required");
        errors.require(
            "parent_occupation",
            &self.parent_occupation,
            "Parent's occupation is required",
        );

        let (Some(event_id), Some(category)) = (event_id, category) else {
            return Err(errors);
        };

        errors.into_result(|| NewRegistration {
            event_id,
            user_id: user_id.clone(),
            registrant: self.registrant(),
            affiliation: match category {
                Category::Student => Affiliation::Student {
                    school_class: self.school_class.trim().to_string(),
                },
                Category::Vocational => Affiliation::Vocational {
                    industry: self.industry.trim().to_string(),
                },
            },
        })
    }

    fn registrant(&self) -> Registrant {
        Registrant {
            full_name: self.full_name.trim().to_string(),
            residential_address: self.residential_address.trim().to_string(),
            phone_number: self.phone_number.trim().to_string(),
            church: self.church.trim().to_string(),
            parent_full_name: self.parent_full_name.trim().to_string(),
            parent_phone_number: self.parent_phone_number.trim().to_string(),
            parent_church: self.parent_church.trim().to_string(),
            parent_occupation: self.parent_occupation.trim().to_string(),
        }
    }
}

/// Where a registration form currently stands.
#[derive(Debug, Clone, Default)]
pub enum SubmissionState {
    /// Nothing submitted yet.
    #[default]
    Idle,
    /// Stored by the backend.
    Succeeded(Registration),
    /// Rejected locally; nothing was sent.
    Invalid(FieldErrors),
    /// The backend failed or only an optimistic copy exists.
    Failed(String),
}

impl SubmissionState {
    /// Field errors to render inline.
    #[must_use]
    pub fn errors(&self) -> FieldErrors {
        match self {
            Self::Invalid(errors) => errors.clone(),
            _ => FieldErrors::new(),
        }
    }
}

/// Validate and submit a registration.
///
/// Only a live backend write counts as success; an optimistic echo is
/// reported as a failure so the visitor can try again.
#[instrument(skip(gateway, form, access_token), fields(user_id = %user_id))]
pub async fn submit(
    gateway: &Gateway,
    form: &RegistrationForm,
    route_event: Option<&EventId>,
    user_id: &UserId,
    access_token: &str,
) -> SubmissionState {
    let new = match form.validate(route_event, user_id) {
        Ok(new) => new,
        Err(errors) => {
            tracing::debug!(fields = errors.len(), "Registration form invalid");
            return SubmissionState::Invalid(errors);
        }
    };

    let event_id = new.event_id.to_string();
    add_breadcrumb(
        "registration",
        "Submitted registration",
        Some(&[("event_id", event_id.as_str())]),
    );

    match gateway.registrations().create(&new, access_token).await {
        Ok(Fetched::Live(registration)) => {
            tracing::info!(registration_id = %registration.id, event_id = %event_id, "Registration stored");
            SubmissionState::Succeeded(registration)
        }
        Ok(Fetched::Degraded { reason, .. }) => {
            tracing::warn!(reason = %reason, event_id = %event_id, "Registration only stored optimistically");
            SubmissionState::Failed(reason)
        }
        Err(e) => {
            tracing::error!(error = %e, event_id = %event_id, "Registration failed");
            SubmissionState::Failed(e.to_string())
        }
    }
}
