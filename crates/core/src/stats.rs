//! Admin dashboard figures.

use std::collections::HashMap;

use crate::types::{Event, EventId, RegistrationRecord};

/// Number of registrations shown under "Recent registrations".
pub const RECENT_LIMIT: usize = 5;

/// Registration count for one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventCount {
    pub event_id: EventId,
    pub title: String,
    pub count: usize,
}

/// Everything the dashboard renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_registrations: usize,
    pub active_events: usize,
    pub recent: Vec<RegistrationRecord>,
    pub per_event: Vec<EventCount>,
}

impl DashboardStats {
    /// Compute stats from the full event list and every registration.
    ///
    /// `registrations` is expected newest first; the first
    /// [`RECENT_LIMIT`] become the recent list. Events with no
    /// registrations are left out of `per_event`, which keeps event order.
    #[must_use]
    pub fn compute(events: &[Event], registrations: &[RegistrationRecord]) -> Self {
        let mut counts: HashMap<&EventId, usize> = HashMap::new();
        for record in registrations {
            *counts.entry(&record.registration.event_id).or_default() += 1;
        }

        let per_event = events
            .iter()
            .filter_map(|event| {
                counts.get(&event.id).map(|&count| EventCount {
                    event_id: event.id.clone(),
                    title: event.title.clone(),
                    count,
                })
            })
            .collect();

        Self {
            total_registrations: registrations.len(),
            active_events: events.iter().filter(|e| e.status.is_active()).count(),
            recent: registrations.iter().take(RECENT_LIMIT).cloned().collect(),
            per_event,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, NaiveDate, NaiveTime, Utc};

    use super::*;
    use crate::types::{EventStatus, Registrant, Registration, RegistrationId, UserId};

    fn event(id: &str, status: EventStatus) -> Event {
        Event {
            id: EventId::new(id),
            title: format!("Event {id}"),
            theme: "Theme".to_string(),
            event_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
            bible_text: "John 3:16".to_string(),
            objective: "Worship".to_string(),
            venue: String::new(),
            max_participants: None,
            status,
            description: None,
            created_at: None,
        }
    }

    fn registration(n: i64, event_id: &str) -> RegistrationRecord {
        RegistrationRecord {
            registration: Registration {
                id: RegistrationId::from_millis(n),
                event_id: EventId::new(event_id),
                user_id: UserId::new("u1"),
                registrant: Registrant {
                    full_name: format!("Teen {n}"),
                    ..Registrant::default()
                },
                school_class: None,
                industry: Some("Catering".to_string()),
                registration_date: Utc::now() - Duration::minutes(n),
            },
            event: None,
            profile: None,
        }
    }

    #[test]
    fn test_compute() {
        let events = vec![
            event("a", EventStatus::Upcoming),
            event("b", EventStatus::Ongoing),
            event("c", EventStatus::Completed),
        ];
        let registrations: Vec<_> = (0..7)
            .map(|n| registration(n, if n % 2 == 0 { "a" } else { "c" }))
            .collect();

        let stats = DashboardStats::compute(&events, &registrations);

        assert_eq!(stats.total_registrations, 7);
        assert_eq!(stats.active_events, 2);
        assert_eq!(stats.recent.len(), RECENT_LIMIT);
        assert_eq!(stats.recent[0].registration.registrant.full_name, "Teen 0");

        let per_event: Vec<_> = stats
            .per_event
            .iter()
            .map(|c| (c.event_id.as_str(), c.count))
            .collect();
        assert_eq!(per_event, [("a", 4), ("c", 3)]);
    }

    #[test]
    fn test_compute_empty() {
        let stats = DashboardStats::compute(&[], &[]);
        assert_eq!(stats, DashboardStats::default());
    }
}
