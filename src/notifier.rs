use std::{
    collections::BTreeMap,
    io::{self, Write},
    sync::Mutex,
};

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;

use crate::{calendar::format_day_string, log_debug, log_info, log_warn};

const ENABLE_LOGS: bool = true;

/// Sink for reconciliation findings (banner, popup, OS notification, ...).
///
/// Calls are fire-and-forget: the checker logs an `Err` and carries on, so an implementation
/// cannot affect findings or ledger state by failing.
pub trait Notifier: Send + Sync {
    fn report_missing_days(&self, days: &[NaiveDate], should_alert_externally: bool) -> Result<()>;

    fn report_insufficient_hours(
        &self,
        hours: &BTreeMap<NaiveDate, u32>,
        should_alert_externally: bool,
    ) -> Result<()>;
}

pub fn missing_days_message(days: &[NaiveDate]) -> String {
    if days.is_empty() {
        return "No missed workdays found.".to_string();
    }
    let listed: Vec<String> = days.iter().copied().map(format_day_string).collect();
    format!("Missed workdays: {}", listed.join(", "))
}

pub fn insufficient_hours_message(hours: &BTreeMap<NaiveDate, u32>) -> String {
    if hours.is_empty() {
        return "All logged days meet the working-hours threshold.".to_string();
    }
    let listed: Vec<String> = hours
        .iter()
        .map(|(day, total)| format!("{} ({total}h)", format_day_string(*day)))
        .collect();
    format!("Insufficient hours: {}", listed.join(", "))
}

/// Renders findings as banner lines on the log, and writes them to an alert sink when an
/// external alert is requested. The sink defaults to stderr so stdout stays reserved for
/// command output.
pub struct LogNotifier {
    alerts: Mutex<Box<dyn Write + Send>>,
}

impl Default for LogNotifier {
    fn default() -> Self {
        Self::with_alert_sink(io::stderr())
    }
}

impl LogNotifier {
    pub fn with_alert_sink(sink: impl Write + Send + 'static) -> Self {
        Self {
            alerts: Mutex::new(Box::new(sink)),
        }
    }

    fn alert(&self, message: &str, should_alert_externally: bool) -> Result<()> {
        if !should_alert_externally {
            return Ok(());
        }
        let mut sink = self
            .alerts
            .lock()
            .map_err(|_| anyhow!("alert sink lock poisoned"))?;
        writeln!(sink, "{message}").context("failed to write alert")?;
        sink.flush().context("failed to flush alert")
    }
}

impl Notifier for LogNotifier {
    fn report_missing_days(&self, days: &[NaiveDate], should_alert_externally: bool) -> Result<()> {
        let message = missing_days_message(days);
        if days.is_empty() {
            log_info!("{message}");
        } else {
            log_warn!("{message}");
        }
        self.alert(&message, should_alert_externally)
    }

    fn report_insufficient_hours(
        &self,
        hours: &BTreeMap<NaiveDate, u32>,
        should_alert_externally: bool,
    ) -> Result<()> {
        let message = insufficient_hours_message(hours);
        if hours.is_empty() {
            log_debug!("{message}");
        } else {
            log_warn!("{message}");
            self.alert(&message, should_alert_externally)?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::{
        io::{self, Write},
        sync::{Arc, Mutex},
    };

    /// Cloneable in-memory sink for inspecting alerts.
    #[derive(Clone, Default)]
    pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        pub fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }
}
