//! Ignore-ledger data models.
//!
//! The ledger is the user's record of dismissed findings: days marked non-billable and
//! per-day ignored-hour amounts. Both live in key/value storage (see `keys`).

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::calendar::day::serde_day_string;

/// Accumulated ignored hours for one day. Persisted as `{"date": "<day-string>", "hours": n}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoredHoursEntry {
    #[serde(with = "serde_day_string")]
    pub date: NaiveDate,
    #[serde(deserialize_with = "whole_hours")]
    pub hours: u32,
}

/// Any JSON number is accepted. Fractions are floored and out-of-range values clamp to `u32`.
fn whole_hours<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let hours = f64::deserialize(deserializer)?;
    // Float-to-int `as` saturates, so negatives land on 0 and huge values on u32::MAX.
    Ok(hours.floor() as u32)
}

/// Snapshot of both ledgers, read fresh for each reconciliation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IgnoreLedger {
    pub non_billable_dates: BTreeSet<NaiveDate>,
    pub ignored_hours: Vec<IgnoredHoursEntry>,
}

impl IgnoreLedger {
    pub fn is_non_billable(&self, day: NaiveDate) -> bool {
        self.non_billable_dates.contains(&day)
    }

    /// Any entry for the day suppresses its under-billing warning, whatever the amount.
    pub fn has_ignored_hours(&self, day: NaiveDate) -> bool {
        self.ignored_hours.iter().any(|entry| entry.date == day)
    }

    pub fn ignored_hours_for(&self, day: NaiveDate) -> Option<u32> {
        self.ignored_hours
            .iter()
            .find(|entry| entry.date == day)
            .map(|entry| entry.hours)
    }
}

/// User "ignore" actions, applied synchronously against the ledger store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerCommand {
    IgnoreDay(NaiveDate),
    IgnoreHours(NaiveDate, u32),
    ResetNonBillable,
    ResetIgnoredHours,
}

/// Append `day` unless already present. Returns whether the list changed.
pub fn insert_non_billable(dates: &mut Vec<NaiveDate>, day: NaiveDate) -> bool {
    if dates.contains(&day) {
        return false;
    }
    dates.push(day);
    true
}

/// Add `hours` to the day's entry, creating it at the end if absent.
/// Entries never shrink: repeated ignores accumulate.
pub fn merge_ignored_hours(entries: &mut Vec<IgnoredHoursEntry>, day: NaiveDate, hours: u32) {
    match entries.iter_mut().find(|entry| entry.date == day) {
        Some(entry) => entry.hours = entry.hours.saturating_add(hours),
        None => entries.push(IgnoredHoursEntry { date: day, hours }),
    }
}
