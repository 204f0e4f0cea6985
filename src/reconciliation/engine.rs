use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    calendar::current_week_window,
    db::{Configuration, IgnoreLedger},
};

use super::records::WorkRecord;

/// Outcome of one reconciliation run. Both collections empty means the period is compliant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Findings {
    /// Expected days with no record that were not marked non-billable, in calendar order.
    pub missing_days: Vec<NaiveDate>,
    /// Days billed under the threshold that carry no ignored-hours entry.
    pub insufficient_hours: BTreeMap<NaiveDate, u32>,
}

impl Findings {
    pub fn is_compliant(&self) -> bool {
        self.missing_days.is_empty() && self.insufficient_hours.is_empty()
    }
}

/// Total hours per day. Rows sharing a date add up.
pub fn hours_by_date(records: &[WorkRecord]) -> BTreeMap<NaiveDate, u32> {
    let mut totals = BTreeMap::new();
    for record in records {
        let total = totals.entry(record.date).or_insert(0u32);
        *total = total.saturating_add(record.hours_worked);
    }
    totals
}

/// Reconcile scraped records against the expected window and the ignore ledger.
///
/// Pure: no I/O, so repeated calls with the same inputs give the same findings.
pub fn compute_findings(
    records: &[WorkRecord],
    today: NaiveDate,
    config: &Configuration,
    ledger: &IgnoreLedger,
) -> Findings {
    let totals = hours_by_date(records);

    let missing_days = current_week_window(today)
        .into_iter()
        .filter(|day| !totals.contains_key(day) && !ledger.is_non_billable(*day))
        .collect();

    let insufficient_hours = totals
        .into_iter()
        .filter(|(day, hours)| {
            *hours < config.working_hours_threshold && !ledger.has_ignored_hours(*day)
        })
        .collect();

    Findings {
        missing_days,
        insufficient_hours,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::IgnoredHoursEntry;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(day: NaiveDate, hours: u32) -> WorkRecord {
        WorkRecord {
            date: day,
            hours_worked: hours,
        }
    }

    fn mon() -> NaiveDate {
        ymd(2026, 10, 12)
    }

    fn tue() -> NaiveDate {
        ymd(2026, 10, 13)
    }

    fn wed() -> NaiveDate {
        ymd(2026, 10, 14)
    }

    #[test]
    fn duplicate_rows_accumulate() {
        let totals = hours_by_date(&[
            record(mon(), 3),
            record(mon(), 5),
            record(tue(), 8),
        ]);
        assert_eq!(totals.get(&mon()), Some(&8));
        assert_eq!(totals.get(&tue()), Some(&8));
    }

    #[test]
    fn split_rows_are_not_under_billed() {
        let findings = compute_findings(
            &[record(mon(), 4), record(mon(), 4)],
            mon(),
            &Configuration::default(),
            &IgnoreLedger::default(),
        );
        assert!(findings.is_compliant());
    }

    #[test]
    fn no_records_never_reads_as_compliant() {
        let findings = compute_findings(
            &[],
            wed(),
            &Configuration::default(),
            &IgnoreLedger::default(),
        );
        assert_eq!(findings.missing_days, vec![mon(), tue(), wed()]);
        assert!(!findings.is_compliant());
    }

    #[test]
    fn zero_hour_row_is_present_but_under_billed() {
        let findings = compute_findings(
            &[record(mon(), 0)],
            mon(),
            &Configuration::default(),
            &IgnoreLedger::default(),
        );
        assert!(findings.missing_days.is_empty());
        assert_eq!(findings.insufficient_hours.get(&mon()), Some(&0));
    }

    #[test]
    fn threshold_comes_from_configuration() {
        let config = Configuration {
            working_hours_threshold: 5,
            notify_on_completion: false,
        };
        let findings = compute_findings(
            &[record(mon(), 5), record(tue(), 4)],
            tue(),
            &config,
            &IgnoreLedger::default(),
        );
        assert_eq!(
            findings.insufficient_hours,
            BTreeMap::from([(tue(), 4)])
        );
    }

    #[test]
    fn any_ignored_amount_suppresses_the_day() {
        let ledger = IgnoreLedger {
            ignored_hours: vec![IgnoredHoursEntry {
                date: tue(),
                hours: 1,
            }],
            ..IgnoreLedger::default()
        };
        let findings = compute_findings(
            &[record(mon(), 8), record(tue(), 0)],
            tue(),
            &Configuration::default(),
            &ledger,
        );
        assert!(findings.is_compliant());
    }

    #[test]
    fn non_billable_day_is_not_missing() {
        let ledger = IgnoreLedger {
            non_billable_dates: [tue()].into_iter().collect(),
            ..IgnoreLedger::default()
        };
        let findings = compute_findings(
            &[record(mon(), 8)],
            wed(),
            &Configuration::default(),
            &ledger,
        );
        assert_eq!(findings.missing_days, vec![wed()]);
    }

    #[test]
    fn repeated_runs_agree() {
        let records = [record(mon(), 8), record(tue(), 5)];
        let config = Configuration::default();
        let ledger = IgnoreLedger::default();
        assert_eq!(
            compute_findings(&records, wed(), &config, &ledger),
            compute_findings(&records, wed(), &config, &ledger)
        );
    }
}
