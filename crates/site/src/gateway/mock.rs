//! Fallback data for degraded reads and writes.

use chrono::{NaiveDate, NaiveTime, Utc};
use sabo_teens_core::{Event, EventId, EventStatus};

/// The sample event shown when the events table cannot be read.
#[must_use]
pub fn mock_event(id: EventId) -> Event {
    Event {
        id,
        title: "Teenagers Prayer Conference".to_string(),
        theme: "GETTING DEEP IN CHRIST".to_string(),
        event_date: NaiveDate::from_ymd_opt(2025, 12, 6).unwrap_or_default(),
        start_time: NaiveTime::from_hms_opt(7, 0, 0).unwrap_or_default(),
        end_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap_or_default(),
        bible_text: "Isaiah 64:4, 1 Corinthians 2:9-16".to_string(),
        objective: "3 Hours of Praying in Tongues to get Wisdom to Live a Glorious Life"
            .to_string(),
        venue: "Foursquare Gospel Church Sabo District".to_string(),
        max_participants: Some(100),
        status: EventStatus::Upcoming,
        description: Some(
            "Join us for a powerful prayer conference focused on deepening our relationship \
             with Christ through the power of praying in tongues."
                .to_string(),
        ),
        created_at: None,
    }
}

/// Current time in milliseconds, used for optimistic identifiers.
#[must_use]
pub fn optimistic_millis() -> i64 {
    Utc::now().timestamp_millis()
}
