//! ISO-8601 date handling shared by the mapper, filters and table.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Display format of date columns (`03/15/2024`)
pub const DISPLAY_FORMAT: &str = "%m/%d/%Y";

/// Parse an ISO-8601 calendar date.
///
/// Accepts a plain `YYYY-MM-DD`, or an RFC 3339 / naive `YYYY-MM-DDTHH:MM:SS`
/// timestamp reduced to its date. Returns `None` for empty or malformed input.
pub fn parse_iso_date(input: &str) -> Option<NaiveDate> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|value| value.date_naive())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|value| value.date())
        })
}

/// Render a date with `format`, or an empty cell when unset
pub fn format_date(date: Option<NaiveDate>, format: &str) -> String {
    date.map(|d| d.format(format).to_string()).unwrap_or_default()
}
