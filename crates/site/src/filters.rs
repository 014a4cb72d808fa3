//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use chrono::NaiveDate;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Formats an ISO date as e.g. `Saturday, December 6, 2025`.
///
/// Values that are not `YYYY-MM-DD` pass through unchanged.
///
/// Usage in templates: `{{ event.event_date|long_date }}`
#[askama::filter_fn]
pub fn long_date(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format_long_date(&value.to_string()))
}

/// Formats an ISO date as e.g. `Dec 6, 2025`.
///
/// Usage in templates: `{{ event.event_date|short_date }}`
#[askama::filter_fn]
pub fn short_date(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let value = value.to_string();
    Ok(NaiveDate::parse_from_str(&value, "%Y-%m-%d")
        .map_or(value, |date| date.format("%b %-d, %Y").to_string()))
}

fn format_long_date(value: &str) -> String {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_or_else(
        |_| value.to_string(),
        |date| date.format("%A, %B %-d, %Y").to_string(),
    )
}
