//! Event registration records.
//!
//! A registration carries exactly one of `school_class` / `industry`. The
//! write type [`NewRegistration`] enforces that through [`Affiliation`]; the
//! read types keep both columns as they come back from the backend.

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use super::{Category, EventId, EventSummary, ProfileSummary, RegistrationId, UserId};

/// Personal and parent/guardian details shared by every registration shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registrant {
    pub full_name: String,
    pub residential_address: String,
    pub phone_number: String,
    pub church: String,
    pub parent_full_name: String,
    pub parent_phone_number: String,
    pub parent_church: String,
    pub parent_occupation: String,
}

/// What the registrant does, decided by the category selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Affiliation {
    /// In school; `school_class` is e.g. "Community High School, SS2".
    Student { school_class: String },
    /// Learning or working a trade; `industry` is e.g. "Fashion Design".
    Vocational { industry: String },
}

impl Affiliation {
    /// The category this affiliation belongs to.
    #[must_use]
    pub const fn category(&self) -> Category {
        match self {
            Self::Student { .. } => Category::Student,
            Self::Vocational { .. } => Category::Vocational,
        }
    }

    /// `(school_class, industry)` column values.
    #[must_use]
    pub fn columns(&self) -> (Option<&str>, Option<&str>) {
        match self {
            Self::Student { school_class } => (Some(school_class), None),
            Self::Vocational { industry } => (None, Some(industry)),
        }
    }
}

// Always writes both columns so the unused one is stored as NULL.
impl Serialize for Affiliation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (school_class, industry) = self.columns();
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("school_class", &school_class)?;
        map.serialize_entry("industry", &industry)?;
        map.end()
    }
}

/// Insert payload for the `registrations` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRegistration {
    pub event_id: EventId,
    pub user_id: UserId,
    #[serde(flatten)]
    pub registrant: Registrant,
    #[serde(flatten)]
    pub affiliation: Affiliation,
}

/// A stored registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub id: RegistrationId,
    pub event_id: EventId,
    pub user_id: UserId,
    #[serde(flatten)]
    pub registrant: Registrant,
    #[serde(default)]
    pub school_class: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    pub registration_date: DateTime<Utc>,
}

impl Registration {
    /// Build the record an optimistic insert echoes back.
    #[must_use]
    pub fn from_new(id: RegistrationId, new: &NewRegistration, now: DateTime<Utc>) -> Self {
        let (school_class, industry) = new.affiliation.columns();
        Self {
            id,
            event_id: new.event_id.clone(),
            user_id: new.user_id.clone(),
            registrant: new.registrant.clone(),
            school_class: school_class.map(str::to_string),
            industry: industry.map(str::to_string),
            registration_date: now,
        }
    }

    /// Recover the affiliation, if exactly one column is set.
    #[must_use]
    pub fn affiliation(&self) -> Option<Affiliation> {
        match (&self.school_class, &self.industry) {
            (Some(school_class), None) => Some(Affiliation::Student {
                school_class: school_class.clone(),
            }),
            (None, Some(industry)) => Some(Affiliation::Vocational {
                industry: industry.clone(),
            }),
            _ => None,
        }
    }
}

/// A registration with its event and profile embedded, as listed for admins
/// and on the account page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRecord {
    #[serde(flatten)]
    pub registration: Registration,
    #[serde(rename = "events", default)]
    pub event: Option<EventSummary>,
    #[serde(rename = "profiles", default)]
    pub profile: Option<ProfileSummary>,
}

impl RegistrationRecord {
    /// Title of the embedded event, or an empty string.
    #[must_use]
    pub fn event_title(&self) -> &str {
        self.event.as_ref().map_or("", |event| event.title.as_str())
    }
}

/// Flat projection of a registration used for CSV export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRow {
    #[serde(flatten)]
    pub registrant: Registrant,
    #[serde(default)]
    pub school_class: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    pub registration_date: DateTime<Utc>,
    #[serde(rename = "events", default)]
    pub event: Option<EventSummary>,
}

impl From<&RegistrationRecord> for ExportRow {
    fn from(record: &RegistrationRecord) -> Self {
        Self {
            registrant: record.registration.registrant.clone(),
            school_class: record.registration.school_class.clone(),
            industry: record.registration.industry.clone(),
            registration_date: record.registration.registration_date,
            event: record.event.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn registrant() -> Registrant {
        Registrant {
            full_name: "Ada Okafor".to_string(),
            residential_address: "12 Herbert Macaulay Way, Yaba".to_string(),
            phone_number: "+234 803 000 1111".to_string(),
            church: "Foursquare Gospel Church Sabo".to_string(),
            parent_full_name: "Ngozi Okafor".to_string(),
            parent_phone_number: "0803 222 3333".to_string(),
            parent_church: "Foursquare Gospel Church Sabo".to_string(),
            parent_occupation: "Nurse".to_string(),
        }
    }

    fn new_registration(affiliation: Affiliation) -> NewRegistration {
        NewRegistration {
            event_id: EventId::new("1"),
            user_id: UserId::new("u1"),
            registrant: registrant(),
            affiliation,
        }
    }

    #[test]
    fn test_student_payload_nulls_industry() {
        let new = new_registration(Affiliation::Student {
            school_class: "Community High, SS2".to_string(),
        });
        let value = serde_json::to_value(&new).unwrap();

        assert_eq!(value["school_class"], "Community High, SS2");
        assert!(value["industry"].is_null());
        assert!(value.as_object().unwrap().contains_key("industry"));
        assert_eq!(value["full_name"], "Ada Okafor");
        assert_eq!(value["event_id"], "1");
    }

    #[test]
    fn test_vocational_payload_nulls_school_class() {
        let new = new_registration(Affiliation::Vocational {
            industry: "Fashion Design".to_string(),
        });
        let value = serde_json::to_value(&new).unwrap();

        assert!(value["school_class"].is_null());
        assert_eq!(value["industry"], "Fashion Design");
    }

    #[test]
    fn test_optimistic_echo_keeps_affiliation() {
        let new = new_registration(Affiliation::Student {
            school_class: "Community High, SS2".to_string(),
        });
        let echoed = Registration::from_new(RegistrationId::from_millis(42), &new, Utc::now());

        assert_eq!(echoed.industry, None);
        assert_eq!(echoed.affiliation().unwrap().category(), Category::Student);
    }

    #[test]
    fn test_record_with_embedded_event_and_profile() {
        let json = serde_json::json!({
            "id": "r1",
            "event_id": "e1",
            "user_id": "u1",
            "full_name": "Ada Okafor",
            "residential_address": "12 Herbert Macaulay Way",
            "phone_number": "0803",
            "school_class": null,
            "industry": "Catering",
            "church": "FGC Sabo",
            "parent_full_name": "Ngozi Okafor",
            "parent_phone_number": "0803",
            "parent_church": "FGC Sabo",
            "parent_occupation": "Nurse",
            "registration_date": "2025-11-20T14:05:00+00:00",
            "events": {"id": "e1", "title": "Youth Retreat", "event_date": "2026-04-03", "status": "upcoming"},
            "profiles": {"full_name": "Ada O.", "email": "ada@example.com"}
        });

        let record: RegistrationRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record.event_title(), "Youth Retreat");
        assert_eq!(
            record.registration.affiliation(),
            Some(Affiliation::Vocational {
                industry: "Catering".to_string()
            })
        );
        assert_eq!(
            record.profile.unwrap().email.as_deref(),
            Some("ada@example.com")
        );
    }
}
