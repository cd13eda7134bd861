//! Bar — O/H/L/C/V for one time period.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::time::parse_timestamp;
use super::{parse_float, parse_int, Period, ValidationError};

/// Raw textual bar fields as they arrive from a CSV row or a live report.
/// Absent and blank values mean the same thing: the field is unset.
#[derive(Debug, Default, Clone)]
pub struct BarFields<'a> {
    pub start_time: Option<&'a str>,
    pub period: Option<&'a str>,
    pub open: Option<&'a str>,
    pub high: Option<&'a str>,
    pub low: Option<&'a str>,
    pub close: Option<&'a str>,
    pub volume: Option<&'a str>,
}

/// Instrument bar with O/H/L/C/V, period, and start time.
///
/// Every field is optional — live feeds routinely push partial bars. When
/// both `high` and `low` are present, `high >= low` holds; building a bar
/// that violates it is a [`ValidationError`], never a silent clamp.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub start_time: Option<DateTime<Utc>>,
    pub period: Option<Period>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<i64>,
}

impl Bar {
    /// Build a validated bar from raw textual fields.
    pub fn from_fields(fields: &BarFields<'_>) -> Result<Self, ValidationError> {
        let bar = Bar {
            start_time: parse_timestamp(fields.start_time)?,
            period: fields
                .period
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .map(str::parse)
                .transpose()?,
            open: parse_float("open", fields.open)?,
            high: parse_float("high", fields.high)?,
            low: parse_float("low", fields.low)?,
            close: parse_float("close", fields.close)?,
            volume: parse_int("volume", fields.volume)?,
        };
        bar.validate()?;
        Ok(bar)
    }

    /// Check the high/low invariant.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let (Some(high), Some(low)) = (self.high, self.low) {
            if high < low {
                return Err(ValidationError::HighBelowLow { high, low });
            }
        }
        Ok(())
    }

    /// Latest price the bar establishes: close where present, else open.
    pub fn last_price(&self) -> Option<f64> {
        self.close.or(self.open)
    }

    /// Change between the open and the close.
    pub fn oc_change(&self) -> Option<f64> {
        Some(self.close? - self.open?)
    }

    /// Absolute change between the open and the close.
    pub fn oc_delta(&self) -> Option<f64> {
        self.oc_change().map(f64::abs)
    }

    /// Difference between the high and the low.
    pub fn size(&self) -> Option<f64> {
        Some(self.high? - self.low?)
    }
}

impl fmt::Display for Bar {
    /// Compact listing of the fields that are present, e.g.
    /// `<Bar: open=10, close=20, volume=1000>`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut props: Vec<String> = Vec::new();
        for (name, value) in [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ] {
            if let Some(value) = value {
                props.push(format!("{name}={value}"));
            }
        }
        if let Some(volume) = self.volume {
            props.push(format!("volume={volume}"));
        }
        if let Some(period) = self.period {
            props.push(format!("period={period}"));
        }
        if let Some(start_time) = self.start_time {
            props.push(format!("start_time={}", start_time.to_rfc3339()));
        }
        write!(f, "<Bar: {}>", props.join(", "))
    }
}
