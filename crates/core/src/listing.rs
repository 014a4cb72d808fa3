//! In-memory filtering of the small lists the site renders.
//!
//! Event catalogs and registration tables are fetched whole and narrowed
//! here, so switching a filter never needs another backend round trip.

use crate::types::{Event, EventId, EventStatus, RegistrationRecord};

/// Status tab on the public event catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventFilter {
    #[default]
    All,
    Status(EventStatus),
}

impl EventFilter {
    /// Tabs in display order.
    pub const TABS: [Self; 4] = [
        Self::All,
        Self::Status(EventStatus::Upcoming),
        Self::Status(EventStatus::Ongoing),
        Self::Status(EventStatus::Completed),
    ];

    /// Parse a `?status=` query value; unknown values fall back to `All`.
    #[must_use]
    pub fn from_query(value: Option<&str>) -> Self {
        value
            .and_then(|v| v.parse::<EventStatus>().ok())
            .map_or(Self::All, Self::Status)
    }

    /// Query value for links.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Status(status) => status.as_str(),
        }
    }

    /// Tab label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All Events",
            Self::Status(EventStatus::Upcoming) => "Upcoming",
            Self::Status(EventStatus::Ongoing) => "Current",
            Self::Status(EventStatus::Completed) => "Previous",
        }
    }

    /// Whether `event` belongs under this tab.
    #[must_use]
    pub fn matches(self, event: &Event) -> bool {
        match self {
            Self::All => true,
            Self::Status(status) => event.status == status,
        }
    }

    /// Events under this tab, preserving input order.
    #[must_use]
    pub fn apply(self, events: &[Event]) -> Vec<Event> {
        events.iter().filter(|e| self.matches(e)).cloned().collect()
    }
}

/// Sort events by date, then start time, ascending.
pub fn sort_by_date(events: &mut [Event]) {
    events.sort_by(|a, b| {
        a.event_date
            .cmp(&b.event_date)
            .then(a.start_time.cmp(&b.start_time))
    });
}

/// Up to `limit` events other than `current`, in input order.
#[must_use]
pub fn related_events(events: Vec<Event>, current: &EventId, limit: usize) -> Vec<Event> {
    events
        .into_iter()
        .filter(|e| &e.id != current)
        .take(limit)
        .collect()
}

/// Search box and event selector on the admin registrations page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationSearch {
    term: String,
    event_id: Option<EventId>,
}

impl RegistrationSearch {
    /// Build a search; blank inputs mean "no constraint".
    #[must_use]
    pub fn new(term: Option<&str>, event_id: Option<&str>) -> Self {
        Self {
            term: term.map(str::trim).unwrap_or_default().to_lowercase(),
            event_id: event_id
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(EventId::from),
        }
    }

    /// Lowercased search term.
    #[must_use]
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Selected event, if any.
    #[must_use]
    pub const fn event_id(&self) -> Option<&EventId> {
        self.event_id.as_ref()
    }

    /// Case-insensitive match on registrant name, parent name or church,
    /// combined with the event selector.
    #[must_use]
    pub fn matches(&self, record: &RegistrationRecord) -> bool {
        let registrant = &record.registration.registrant;
        let matches_term = self.term.is_empty()
            || [
                &registrant.full_name,
                &registrant.parent_full_name,
                &registrant.church,
            ]
            .iter()
            .any(|field| field.to_lowercase().contains(&self.term));

        let matches_event = self
            .event_id
            .as_ref()
            .is_none_or(|id| &record.registration.event_id == id);

        matches_term && matches_event
    }

    /// Records matching this search, preserving input order.
    #[must_use]
    pub fn apply<'a>(&self, records: &'a [RegistrationRecord]) -> Vec<&'a RegistrationRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}
