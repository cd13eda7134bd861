//! Bar period — a count of time units, parsed from compact strings like "30m".

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// Units a bar period can be expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
    Weeks,
    Months,
    Years,
}

impl PeriodUnit {
    /// All units, in the order they are tried when matching unit text.
    pub const ALL: [PeriodUnit; 7] = [
        PeriodUnit::Seconds,
        PeriodUnit::Minutes,
        PeriodUnit::Hours,
        PeriodUnit::Days,
        PeriodUnit::Weeks,
        PeriodUnit::Months,
        PeriodUnit::Years,
    ];

    /// Canonical lower-case name — also the longest accepted spelling.
    pub fn name(self) -> &'static str {
        match self {
            PeriodUnit::Seconds => "seconds",
            PeriodUnit::Minutes => "minutes",
            PeriodUnit::Hours => "hours",
            PeriodUnit::Days => "days",
            PeriodUnit::Weeks => "weeks",
            PeriodUnit::Months => "months",
            PeriodUnit::Years => "years",
        }
    }

    /// Common abbreviations that don't prefix the canonical name.
    fn abbreviations(self) -> &'static [&'static str] {
        match self {
            PeriodUnit::Hours => &["hrs"],
            PeriodUnit::Weeks => &["wks"],
            PeriodUnit::Months => &["mns", "mnths"],
            PeriodUnit::Years => &["yrs"],
            _ => &[],
        }
    }

    /// Whether lower-cased unit text selects this unit: the canonical name
    /// (or an accepted abbreviation) must start with the given text.
    fn matches(self, text: &str) -> bool {
        self.name().starts_with(text)
            || self.abbreviations().iter().any(|abbr| abbr.starts_with(text))
    }
}

impl fmt::Display for PeriodUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Time period of a bar: `count` × `unit`, e.g. 30 minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub count: u32,
    pub unit: PeriodUnit,
}

impl Period {
    /// Pre-parsed construction. The grammar below is only for textual input;
    /// typed callers can't produce an invalid period.
    pub fn new(count: u32, unit: PeriodUnit) -> Self {
        Self { count, unit }
    }
}

impl FromStr for Period {
    type Err = ValidationError;

    /// Grammar: `<integer><unit-text>` with optional surrounding and
    /// separating whitespace. Unit text matches by prefix against the
    /// canonical names in [`PeriodUnit::ALL`] order, so an empty unit text
    /// selects seconds.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits_end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        let (digits, unit_text) = trimmed.split_at(digits_end);

        let count: u32 = digits
            .parse()
            .map_err(|_| ValidationError::BadPeriod(s.to_string()))?;

        let unit_text = unit_text.trim().to_lowercase();
        let unit = PeriodUnit::ALL
            .into_iter()
            .find(|unit| unit.matches(&unit_text))
            .ok_or(ValidationError::UnknownUnit(unit_text))?;

        Ok(Period { count, unit })
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.count, self.unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Period {
        s.parse().unwrap()
    }

    #[test]
    fn seconds() {
        assert_eq!(parse("1s"), Period::new(1, PeriodUnit::Seconds));
        assert_eq!(parse("30 seconds"), Period::new(30, PeriodUnit::Seconds));
        assert_eq!(parse("15sec"), Period::new(15, PeriodUnit::Seconds));
        // Empty unit text prefixes every canonical name; seconds wins by order.
        assert_eq!(parse("30"), Period::new(30, PeriodUnit::Seconds));
    }

    #[test]
    fn minutes() {
        assert_eq!(parse("30m"), Period::new(30, PeriodUnit::Minutes));
        assert_eq!(parse("30minutes"), Period::new(30, PeriodUnit::Minutes));
        assert_eq!(parse("  15      minutes   "), Period::new(15, PeriodUnit::Minutes));
        assert_eq!(parse("15MINutes"), Period::new(15, PeriodUnit::Minutes));
    }

    #[test]
    fn hours() {
        for text in ["4hours", "4h", "4hr", "4hrs"] {
            assert_eq!(parse(text), Period::new(4, PeriodUnit::Hours));
        }
    }

    #[test]
    fn days_and_weeks() {
        assert_eq!(parse("7day"), Period::new(7, PeriodUnit::Days));
        assert_eq!(parse("7days"), Period::new(7, PeriodUnit::Days));
        for text in ["4w", "4week", "4weeks", "4wks"] {
            assert_eq!(parse(text), Period::new(4, PeriodUnit::Weeks));
        }
    }

    #[test]
    fn months() {
        for text in ["2months", "2mn", "2mns", "2mnth", "2mnths"] {
            assert_eq!(parse(text), Period::new(2, PeriodUnit::Months));
        }
    }

    #[test]
    fn years() {
        for text in ["5years", "5y", "5yr", "5yrs"] {
            assert_eq!(parse(text), Period::new(5, PeriodUnit::Years));
        }
    }

    #[test]
    fn parsing_is_idempotent_with_typed_construction() {
        let canonical = Period::new(30, PeriodUnit::Minutes);
        assert_eq!(parse("30m"), canonical);
        assert_eq!(parse(&canonical.to_string()), canonical);
    }

    #[test]
    fn missing_digits_names_the_whole_string() {
        assert_eq!(
            "fake".parse::<Period>().unwrap_err(),
            ValidationError::BadPeriod("fake".into())
        );
    }

    #[test]
    fn unknown_unit_names_the_unit_text() {
        assert_eq!(
            "1fake".parse::<Period>().unwrap_err(),
            ValidationError::UnknownUnit("fake".into())
        );
    }

    #[test]
    fn display_is_count_and_canonical_unit() {
        assert_eq!(parse("5m").to_string(), "5 minutes");
        assert_eq!(parse("4h").to_string(), "4 hours");
    }
}
