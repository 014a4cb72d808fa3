//! CSV export of registrations.
//!
//! The header row is written bare; every data field is double-quoted with
//! embedded quotes doubled. Rows end with `\n` and dates use `YYYY-MM-DD`.

use chrono::NaiveDate;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use thiserror::Error;

use crate::types::ExportRow;

/// Column headers, in output order.
pub const HEADERS: [&str; 13] = [
    "Full Name",
    "Residential Address",
    "Phone Number",
    "School/Class",
    "Industry",
    "Church",
    "Parent Full Name",
    "Parent Phone Number",
    "Parent Church",
    "Parent Occupation",
    "Registration Date",
    "Event Title",
    "Event Date",
];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Errors from building the CSV body.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write CSV row: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to flush CSV output: {0}")]
    Flush(String),
}

fn record(row: &ExportRow) -> [String; 13] {
    let r = &row.registrant;
    let (event_title, event_date) = row.event.as_ref().map_or_else(
        || (String::new(), String::new()),
        |event| {
            (
                event.title.clone(),
                event.event_date.format(DATE_FORMAT).to_string(),
            )
        },
    );

    [
        r.full_name.clone(),
        r.residential_address.clone(),
        r.phone_number.clone(),
        row.school_class.clone().unwrap_or_default(),
        row.industry.clone().unwrap_or_default(),
        r.church.clone(),
        r.parent_full_name.clone(),
        r.parent_phone_number.clone(),
        r.parent_church.clone(),
        r.parent_occupation.clone(),
        row.registration_date.format(DATE_FORMAT).to_string(),
        event_title,
        event_date,
    ]
}

/// Serialize `rows` to CSV bytes: one header line, then one line per row.
///
/// # Errors
///
/// Returns an error if the CSV writer fails.
pub fn registrations_csv(rows: &[ExportRow]) -> Result<Vec<u8>, ExportError> {
    let mut out = HEADERS.join(",").into_bytes();
    out.push(b'\n');

    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(out);

    for row in rows {
        writer.write_record(record(row))?;
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::Flush(e.error().to_string()))
}

/// `registrations-YYYY-MM-DD.csv`
#[must_use]
pub fn export_filename(today: NaiveDate) -> String {
    format!("registrations-{}.csv", today.format(DATE_FORMAT))
}
