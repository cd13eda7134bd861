//! Domain value types: bars, ticks, periods, and orders.
//!
//! Everything here is an immutable value record created at the data-source
//! boundary (CSV row, live report, or strategy code) and consumed by event
//! handlers. Raw textual input is validated once, at construction.

mod bar;
mod order;
mod period;
mod tick;
mod time;

pub use bar::{Bar, BarFields};
pub use order::{Order, Signal};
pub use period::{Period, PeriodUnit};
pub use tick::{Tick, TickFields};

use thiserror::Error;

/// Malformed market-data input.
///
/// Fatal to the record being constructed: the error propagates to the caller
/// (aborting, e.g., the replay of the offending row) rather than being
/// silently skipped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} is not a number: '{value}'")]
    BadNumber { field: &'static str, value: String },

    #[error("high ({high}) is less than low ({low})")]
    HighBelowLow { high: f64, low: f64 },

    #[error("couldn't parse period '{0}'")]
    BadPeriod(String),

    #[error("unknown time unit '{0}'")]
    UnknownUnit(String),

    #[error("unparseable timestamp '{0}'")]
    BadTimestamp(String),
}

/// Parse an optional textual field as a float. Blank text is absent, not an
/// error.
pub(crate) fn parse_float(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<f64>, ValidationError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => text.parse().map(Some).map_err(|_| ValidationError::BadNumber {
            field,
            value: text.to_string(),
        }),
    }
}

/// Parse an optional textual field as a base-10 integer.
pub(crate) fn parse_int(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<i64>, ValidationError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => text.parse().map(Some).map_err(|_| ValidationError::BadNumber {
            field,
            value: text.to_string(),
        }),
    }
}
