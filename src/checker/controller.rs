use std::{sync::Arc, time::Duration};

use anyhow::Result;
use chrono::{Local, NaiveDate};
use serde::Serialize;
use tokio::{task::JoinHandle, time};

use crate::{
    db::{Configuration, Database, IgnoreLedger, LedgerCommand},
    log_error, log_info,
    notifier::Notifier,
    reconciliation::{compute_findings, parse_records, Findings, RawRecord},
};

use super::source::RecordSource;

const ENABLE_LOGS: bool = true;

/// Time the host page needs to finish rendering its own rows before they are scraped.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(4);

/// Everything one run looked at, for callers that want to show more than the findings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckReport {
    pub today: NaiveDate,
    pub configuration: Configuration,
    pub records_scraped: usize,
    pub records_used: usize,
    pub findings: Findings,
}

/// Runs reconciliations and routes "ignore" actions to the ledger.
///
/// Every run reads configuration and ledger fresh, so re-running after a retry or an ignore
/// action is always safe.
#[derive(Clone)]
pub struct ComplianceChecker {
    db: Database,
    notifier: Arc<dyn Notifier>,
}

impl ComplianceChecker {
    pub fn new(db: Database, notifier: Arc<dyn Notifier>) -> Self {
        Self { db, notifier }
    }

    /// Configuration and ledger for a run. Storage failures degrade to defaults.
    async fn load_inputs(&self) -> (Configuration, IgnoreLedger) {
        let config = self.db.load_configuration().await.unwrap_or_else(|err| {
            log_error!("Failed to load configuration, using defaults: {err:#}");
            Configuration::default()
        });
        let ledger = self.db.load_ledger().await.unwrap_or_else(|err| {
            log_error!("Failed to load ignore ledger, assuming empty: {err:#}");
            IgnoreLedger::default()
        });
        (config, ledger)
    }

    pub async fn run_check(&self, raw: &[RawRecord], today: NaiveDate) -> CheckReport {
        let (configuration, ledger) = self.load_inputs().await;
        let records = parse_records(raw);
        let findings = compute_findings(&records, today, &configuration, &ledger);

        log_info!(
            "Checked week of {today}: {} missing day(s), {} under-billed day(s) from {} row(s)",
            findings.missing_days.len(),
            findings.insufficient_hours.len(),
            records.len()
        );

        self.dispatch(&findings, configuration.notify_on_completion);

        CheckReport {
            today,
            configuration,
            records_scraped: raw.len(),
            records_used: records.len(),
            findings,
        }
    }

    fn dispatch(&self, findings: &Findings, should_alert_externally: bool) {
        if let Err(err) = self
            .notifier
            .report_missing_days(&findings.missing_days, should_alert_externally)
        {
            log_error!("Notifier failed to report missing days: {err:#}");
        }
        if let Err(err) = self
            .notifier
            .report_insufficient_hours(&findings.insufficient_hours, should_alert_externally)
        {
            log_error!("Notifier failed to report insufficient hours: {err:#}");
        }
    }

    /// Scrape `source` once `settle_delay` has passed, then run a check.
    /// `today` defaults to the local date at the time the check runs.
    pub fn schedule_check(
        &self,
        source: Arc<dyn RecordSource>,
        settle_delay: Duration,
        today: Option<NaiveDate>,
    ) -> JoinHandle<CheckReport> {
        let checker = self.clone();
        tokio::spawn(async move {
            if !settle_delay.is_zero() {
                time::sleep(settle_delay).await;
            }
            let raw = source.scrape();
            let today = today.unwrap_or_else(|| Local::now().date_naive());
            checker.run_check(&raw, today).await
        })
    }

    pub async fn apply(&self, command: LedgerCommand) -> Result<()> {
        self.db.apply_ledger_command(command).await
    }
}
