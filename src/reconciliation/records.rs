use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{calendar::parse_day, log_debug};

const ENABLE_LOGS: bool = false;

/// One timesheet row exactly as the scraper read it from the host page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecord {
    #[serde(default)]
    pub date_text: String,
    #[serde(default)]
    pub hours_text: String,
}

impl RawRecord {
    pub fn new(date_text: impl Into<String>, hours_text: impl Into<String>) -> Self {
        Self {
            date_text: date_text.into(),
            hours_text: hours_text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkRecord {
    pub date: NaiveDate,
    pub hours_worked: u32,
}

impl WorkRecord {
    /// `None` when the date text is unreadable; the row then counts as absent.
    pub fn from_raw(raw: &RawRecord) -> Option<Self> {
        let date = parse_day(&raw.date_text).ok()?;
        Some(Self {
            date,
            hours_worked: leading_hours(&raw.hours_text),
        })
    }
}

/// Leading integer of an hours cell: `"7h 30m"` is 7, `"1:45"` is 1, no digits is 0.
pub fn leading_hours(text: &str) -> u32 {
    text.trim_start()
        .chars()
        .map_while(|c| c.to_digit(10))
        .fold(0u32, |acc, digit| acc.saturating_mul(10).saturating_add(digit))
}

pub fn parse_records(raw: &[RawRecord]) -> Vec<WorkRecord> {
    let records: Vec<WorkRecord> = raw.iter().filter_map(WorkRecord::from_raw).collect();
    if records.len() < raw.len() {
        log_debug!(
            "Discarded {} scraped row(s) with unreadable dates",
            raw.len() - records.len()
        );
    }
    records
}
