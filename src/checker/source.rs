use std::{fs, path::PathBuf};

use anyhow::{Context, Result};

use crate::{log_warn, reconciliation::RawRecord};

const ENABLE_LOGS: bool = true;

/// The external scraper: whatever reads `{dateText, hoursText}` rows off the host page.
pub trait RecordSource: Send + Sync {
    /// Rows currently visible. A source that cannot read anything returns an empty list.
    fn scrape(&self) -> Vec<RawRecord>;
}

impl RecordSource for Vec<RawRecord> {
    fn scrape(&self) -> Vec<RawRecord> {
        self.clone()
    }
}

/// Rows exported to a JSON array of `{"dateText": ..., "hoursText": ...}` objects.
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn read(&self) -> Result<Vec<RawRecord>> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read records from {}", self.path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse records in {}", self.path.display()))
    }
}

impl RecordSource for JsonFileSource {
    fn scrape(&self) -> Vec<RawRecord> {
        self.read().unwrap_or_else(|err| {
            log_warn!("No timesheet rows available: {err:#}");
            Vec::new()
        })
    }
}
