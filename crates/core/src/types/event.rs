//! Event records.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EventId, EventStatus, UserId};

/// An event row from the `events` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub theme: String,
    pub event_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub bible_text: String,
    pub objective: String,
    #[serde(default)]
    pub venue: String,
    #[serde(default)]
    pub max_participants: Option<u32>,
    pub status: EventStatus,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Event {
    /// Build the record an optimistic write echoes back when the backend is
    /// unreachable.
    #[must_use]
    pub fn from_draft(id: EventId, draft: &EventDraft) -> Self {
        Self {
            id,
            title: draft.title.clone(),
            theme: draft.theme.clone(),
            event_date: draft.event_date,
            start_time: draft.start_time,
            end_time: draft.end_time,
            bible_text: draft.bible_text.clone(),
            objective: draft.objective.clone(),
            venue: draft.venue.clone(),
            max_participants: draft.max_participants,
            status: draft.status,
            description: draft.description.clone(),
            created_at: None,
        }
    }

    /// `HH:MM - HH:MM` label used on cards.
    #[must_use]
    pub fn time_range(&self) -> String {
        format!(
            "{} - {}",
            self.start_time.format("%H:%M"),
            self.end_time.format("%H:%M")
        )
    }
}

/// Write shape for creating or updating an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventDraft {
    pub title: String,
    pub theme: String,
    pub event_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub bible_text: String,
    pub objective: String,
    pub venue: String,
    pub max_participants: Option<u32>,
    pub status: EventStatus,
    pub description: Option<String>,
    /// Author of the event; only sent on create.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<UserId>,
}

/// Event columns embedded in registration listings and exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSummary {
    pub title: String,
    pub event_date: NaiveDate,
}
