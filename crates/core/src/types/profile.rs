//! Application-level user profile.

use serde::{Deserialize, Serialize};

use super::{Email, ProfileRole, UserId};

/// A row from the `profiles` table, keyed by the auth user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: UserId,
    pub email: Email,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: ProfileRole,
}

impl Profile {
    /// Build the profile for a user who has no row yet.
    ///
    /// Uses `full_name` when supplied (sign-up form), otherwise the local part
    /// of the email address. The role is always `user`.
    #[must_use]
    pub fn synthesize(id: UserId, email: Email, full_name: Option<&str>) -> Self {
        let full_name = full_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map_or_else(|| email.local_part().to_string(), str::to_string);

        Self {
            id,
            email,
            full_name: Some(full_name),
            role: ProfileRole::User,
        }
    }

    /// Name shown in the navigation bar.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| self.email.local_part())
    }

    /// Whether the profile may use the admin dashboard.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == ProfileRole::Admin
    }

    /// Apply a partial update locally.
    pub fn apply(&mut self, update: &ProfileUpdate) {
        if let Some(full_name) = &update.full_name {
            self.full_name = Some(full_name.clone());
        }
    }
}

/// Partial profile update. Role changes are not accepted from the site.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

/// Profile columns embedded in registration listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSummary {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}
