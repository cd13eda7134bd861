//! Tick — a single observed price at a point in time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::time::parse_timestamp;
use super::{parse_float, ValidationError};

/// Raw textual tick fields from a live report.
#[derive(Debug, Default, Clone)]
pub struct TickFields<'a> {
    pub time: Option<&'a str>,
    pub price: Option<&'a str>,
}

/// Instrument tick, with price at a point in time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub time: Option<DateTime<Utc>>,
    pub price: Option<f64>,
}

impl Tick {
    /// Build a validated tick from raw textual fields.
    pub fn from_fields(fields: &TickFields<'_>) -> Result<Self, ValidationError> {
        Ok(Tick {
            time: parse_timestamp(fields.time)?,
            price: parse_float("price", fields.price)?,
        })
    }

    /// A timeless tick at `price`. Used by replay for the synthetic tick
    /// derived from each bar.
    pub fn at(price: f64) -> Self {
        Tick {
            time: None,
            price: Some(price),
        }
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut props: Vec<String> = Vec::new();
        if let Some(price) = self.price {
            props.push(format!("price={price}"));
        }
        if let Some(time) = self.time {
            props.push(format!("time={}", time.to_rfc3339()));
        }
        write!(f, "<Tick: {}>", props.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_parses_from_text() {
        let tick = Tick::from_fields(&TickFields {
            time: None,
            price: Some("1.2345"),
        })
        .unwrap();
        assert_eq!(tick.price, Some(1.2345));
        assert_eq!(tick.time, None);
    }

    #[test]
    fn blank_price_is_absent() {
        let tick = Tick::from_fields(&TickFields {
            time: Some(""),
            price: Some(""),
        })
        .unwrap();
        assert_eq!(tick, Tick::default());
    }

    #[test]
    fn bad_price_fails() {
        let err = Tick::from_fields(&TickFields {
            time: None,
            price: Some("test"),
        })
        .unwrap_err();
        assert!(matches!(err, ValidationError::BadNumber { field: "price", .. }));
    }

    #[test]
    fn time_parses_metatrader_format() {
        let tick = Tick::from_fields(&TickFields {
            time: Some("2016.01.02 03:02:00"),
            price: Some("1.2345"),
        })
        .unwrap();
        assert_eq!(
            tick.to_string(),
            "<Tick: price=1.2345, time=2016-01-02T03:02:00+00:00>"
        );
    }

    #[test]
    fn at_is_a_timeless_price() {
        assert_eq!(
            Tick::at(20.0),
            Tick {
                time: None,
                price: Some(20.0)
            }
        );
        assert_eq!(Tick::at(10.0).to_string(), "<Tick: price=10>");
    }
}
