use chrono::NaiveDate;
use thiserror::Error;

/// Format the host page uses for persisted days (`Date.toDateString()`), e.g. `Wed Oct 14 2026`.
const DAY_STRING_FORMAT: &str = "%a %b %d %Y";

/// Every textual form a scraped or user-supplied day may take.
const ACCEPTED_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    DAY_STRING_FORMAT,
    "%a, %b %d, %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%m/%d/%Y",
    "%d %b %Y",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognised day '{0}'")]
pub struct DayParseError(pub String);

pub fn format_day_string(day: NaiveDate) -> String {
    day.format(DAY_STRING_FORMAT).to_string()
}

/// Parse a calendar day from any accepted form. Surrounding whitespace is ignored.
pub fn parse_day(text: &str) -> Result<NaiveDate, DayParseError> {
    let trimmed = text.trim();
    ACCEPTED_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .ok_or_else(|| DayParseError(trimmed.to_string()))
}

/// Serde adapter storing a `NaiveDate` as a day-string.
pub mod serde_day_string {
    use chrono::NaiveDate;
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(day: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_day_string(*day))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_day(&raw).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn formats_like_to_date_string() {
        assert_eq!(format_day_string(ymd(2026, 10, 14)), "Wed Oct 14 2026");
        assert_eq!(format_day_string(ymd(2026, 10, 4)), "Sun Oct 04 2026");
    }

    #[test]
    fn parses_every_accepted_form() {
        let expected = ymd(2026, 10, 14);
        for text in [
            "2026-10-14",
            "Wed Oct 14 2026",
            "Wed, Oct 14, 2026",
            "Oct 14, 2026",
            "October 14, 2026",
            "10/14/2026",
            "14 Oct 2026",
            "  Oct 14, 2026\n",
        ] {
            assert_eq!(parse_day(text), Ok(expected), "input {text:?}");
        }
    }

    #[test]
    fn rejects_garbage_and_wrong_weekday() {
        assert!(parse_day("").is_err());
        assert!(parse_day("yesterday").is_err());
        assert!(parse_day("Mon Oct 14 2026").is_err());
    }

    #[test]
    fn day_string_round_trips_through_parse() {
        let day = ymd(2025, 12, 29);
        assert_eq!(parse_day(&format_day_string(day)), Ok(day));
    }
}
