//! Timestamp parsing for feed fields.
//!
//! Accepts ISO 8601 plus the MetaTrader CSV variants that use dotted or
//! slashed date separators (`2016.01.02 03:04:05`). Everything is UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

use super::ValidationError;

/// Parse an optional textual timestamp. Blank text is absent.
pub(crate) fn parse_timestamp(
    value: Option<&str>,
) -> Result<Option<DateTime<Utc>>, ValidationError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => parse(text).map(Some),
    }
}

fn parse(text: &str) -> Result<DateTime<Utc>, ValidationError> {
    let normalized = normalize_date_separators(text);

    if let Ok(parsed) = DateTime::parse_from_rfc3339(&normalized) {
        return Ok(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(&normalized, format) {
            return Ok(Utc.from_utc_datetime(&parsed));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(&normalized, "%Y-%m-%d") {
        return Ok(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
    }

    Err(ValidationError::BadTimestamp(text.to_string()))
}

/// Rewrite a leading `Y.M.D` or `Y/M/D` date to `Y-M-D`, leaving any time
/// part untouched.
fn normalize_date_separators(text: &str) -> String {
    let date_end = text
        .find(|c: char| c == ' ' || c == 'T')
        .unwrap_or(text.len());
    let (date, rest) = text.split_at(date_end);

    let parts: Vec<&str> = date.split(['.', '/']).collect();
    let all_numeric = parts
        .iter()
        .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()));
    if parts.len() == 3 && all_numeric {
        format!("{}-{}-{}{}", parts[0], parts[1], parts[2], rest)
    } else {
        text.to_string()
    }
}
