//! Date parsing for measure history and analyses.
//!
//! Accepts the ISO-8601 subset produced by the server: calendar dates
//! (`2024-01-31`), date-times with a numeric offset (`2024-01-31T09:36:01+0100`)
//! and RFC 3339 timestamps (`2024-01-31T08:36:01Z`). Anything else is a
//! [`ActivityError::Parse`].

use chrono::{DateTime, NaiveDate, Utc};

use crate::core::errors::{ActivityError, Result};

const EXPECTED_FORMAT: &str = "YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS(+HHMM|Z)";

/// Parse a server date string into a UTC timestamp.
///
/// Calendar dates are anchored at midnight UTC.
pub fn parse_date(input: &str) -> Result<DateTime<Utc>> {
    if input.len() == 10 {
        return NaiveDate::parse_from_str(input, "%Y-%m-%d")
            .map(|date| date.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc())
            .map_err(|e| ActivityError::parse_expecting(input, e.to_string(), EXPECTED_FORMAT));
    }

    if let Ok(parsed) = DateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%z") {
        return Ok(parsed.with_timezone(&Utc));
    }

    DateTime::parse_from_rfc3339(input)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|e| ActivityError::parse_expecting(input, e.to_string(), EXPECTED_FORMAT))
}
