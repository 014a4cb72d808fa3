//! Admin event form.

use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;

use sabo_teens_core::{Event, EventDraft, EventStatus, FieldErrors, UserId};

pub const CREATED_MESSAGE: &str = "Event created successfully";
pub const UPDATED_MESSAGE: &str = "Event updated successfully";
pub const SAVE_FAILED_MESSAGE: &str = "Failed to save event";
pub const DELETED_MESSAGE: &str = "Event deleted successfully";
pub const DELETE_FAILED_MESSAGE: &str = "Failed to delete event";

/// Posted event form. Missing fields deserialize as empty strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EventForm {
    pub title: String,
    pub theme: String,
    pub event_date: String,
    pub start_time: String,
    pub end_time: String,
    pub bible_text: String,
    pub objective: String,
    pub venue: String,
    pub max_participants: String,
    pub status: String,
    pub description: String,
}

impl Default for EventForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            theme: String::new(),
            event_date: String::new(),
            start_time: String::new(),
            end_time: String::new(),
            bible_text: String::new(),
            objective: String::new(),
            venue: String::new(),
            max_participants: String::new(),
            status: EventStatus::Upcoming.as_str().to_string(),
            description: String::new(),
        }
    }
}

impl EventForm {
    /// Prefill the edit form from a stored event.
    #[must_use]
    pub fn from_event(event: &Event) -> Self {
        Self {
            title: event.title.clone(),
            theme: event.theme.clone(),
            event_date: event.event_date.format("%Y-%m-%d").to_string(),
            start_time: event.start_time.format("%H:%M").to_string(),
            end_time: event.end_time.format("%H:%M").to_string(),
            bible_text: event.bible_text.clone(),
            objective: event.objective.clone(),
            venue: event.venue.clone(),
            max_participants: event
                .max_participants
                .map(|n| n.to_string())
                .unwrap_or_default(),
            status: event.status.as_str().to_string(),
            description: event.description.clone().unwrap_or_default(),
        }
    }

    /// Validate and assemble the write payload.
    ///
    /// `created_by` is set on create and left `None` on update.
    ///
    /// # Errors
    ///
    /// Returns every field-level problem found.
    pub fn validate(&self, created_by: Option<UserId>) -> Result<EventDraft, FieldErrors> {
        let mut errors = FieldErrors::new();

        errors.require("title", &self.title, "Event title is required");
        errors.require("theme", &self.theme, "Theme is required");
        let event_date = parse_date(&mut errors, &self.event_date);
        let status = parse_status(&mut errors, &self.status);
        let start_time = parse_time(&mut errors, "start_time", &self.start_time, "Start time is required");
        let end_time = parse_time(&mut errors, "end_time", &self.end_time, "End time is required");
        errors.require("bible_text", &self.bible_text, "Bible text is required");
        errors.require("objective", &self.objective, "Objective is required");
        let max_participants = parse_max_participants(&mut errors, &self.max_participants);

        let (Some(event_date), Some(status), Some(start_time), Some(end_time), Ok(max_participants)) =
            (event_date, status, start_time, end_time, max_participants)
        else {
            return Err(errors);
        };

        let description = self.description.trim();
        errors.into_result(|| EventDraft {
            title: self.title.trim().to_string(),
            theme: self.theme.trim().to_string(),
            event_date,
            start_time,
            end_time,
            bible_text: self.bible_text.trim().to_string(),
            objective: self.objective.trim().to_string(),
            venue: self.venue.trim().to_string(),
            max_participants,
            status,
            description: (!description.is_empty()).then(|| description.to_string()),
            created_by,
        })
    }
}

fn parse_date(errors: &mut FieldErrors, value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        errors.add("event_date", "Event date is required");
        return None;
    }
    let parsed = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok();
    if parsed.is_none() {
        errors.add("event_date", "Please enter a valid date");
    }
    parsed
}

fn parse_status(errors: &mut FieldErrors, value: &str) -> Option<EventStatus> {
    let parsed = value.parse::<EventStatus>().ok();
    if parsed.is_none() {
        errors.add("status", "Status is required");
    }
    parsed
}

// Browsers post `HH:MM`; stored rows come back as `HH:MM:SS`.
fn parse_time(
    errors: &mut FieldErrors,
    field: &'static str,
    value: &str,
    required: &str,
) -> Option<NaiveTime> {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, required);
        return None;
    }
    let parsed = NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok();
    if parsed.is_none() {
        errors.add(field, "Please enter a valid time");
    }
    parsed
}

fn parse_max_participants(errors: &mut FieldErrors, value: &str) -> Result<Option<u32>, ()> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    match value.parse::<u32>() {
        Ok(n) if n > 0 => Ok(Some(n)),
        _ => {
            errors.add(
                "max_participants",
                "Maximum participants must be a positive whole number",
            );
            Err(())
        }
    }
}
