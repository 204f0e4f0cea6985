use std::collections::BTreeSet;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::Connection;
use serde_json::Value;

use crate::{
    calendar::{format_day_string, parse_day},
    db::{
        helpers::{read_item, write_item},
        models::{
            keys,
            ledger::{insert_non_billable, merge_ignored_hours},
            IgnoreLedger, IgnoredHoursEntry, LedgerCommand,
        },
        Database,
    },
    log_debug, log_info, log_warn,
};

const ENABLE_LOGS: bool = true;

/// Top-level JSON array stored under `key`. Anything else is treated as empty.
fn decode_array(key: &str, raw: Option<&str>) -> Vec<Value> {
    let Some(raw) = raw else {
        return Vec::new();
    };

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => items,
        Ok(_) => {
            log_warn!("Discarding {key}: stored value is not an array");
            Vec::new()
        }
        Err(err) => {
            log_warn!("Discarding {key}: malformed JSON ({err})");
            Vec::new()
        }
    }
}

/// Items decoded from one stored array, plus the raw elements that could not be read.
/// Writes put the unreadable elements back so another writer's data is never lost.
struct Decoded<T> {
    items: Vec<T>,
    unreadable: Vec<Value>,
}

fn decode_non_billable(raw: Option<&str>) -> Decoded<NaiveDate> {
    let mut decoded = Decoded {
        items: Vec::new(),
        unreadable: Vec::new(),
    };
    for item in decode_array(keys::NON_BILLABLE_DATES, raw) {
        match item.as_str().map(parse_day) {
            Some(Ok(day)) => {
                insert_non_billable(&mut decoded.items, day);
            }
            _ => {
                log_warn!("Skipping unreadable non-billable date {item}");
                decoded.unreadable.push(item);
            }
        }
    }
    decoded
}

fn decode_ignored_hours(raw: Option<&str>) -> Decoded<IgnoredHoursEntry> {
    let mut decoded = Decoded {
        items: Vec::new(),
        unreadable: Vec::new(),
    };
    for item in decode_array(keys::IGNORED_HOURS, raw) {
        match serde_json::from_value::<IgnoredHoursEntry>(item.clone()) {
            // Folding keeps one entry per day even if storage holds duplicates.
            Ok(entry) => merge_ignored_hours(&mut decoded.items, entry.date, entry.hours),
            Err(err) => {
                log_warn!("Skipping unreadable ignored-hours entry {item}: {err}");
                decoded.unreadable.push(item);
            }
        }
    }
    decoded
}

fn read_non_billable(conn: &Connection) -> Result<Decoded<NaiveDate>> {
    Ok(decode_non_billable(
        read_item(conn, keys::NON_BILLABLE_DATES)?.as_deref(),
    ))
}

fn write_non_billable(conn: &Connection, dates: &[NaiveDate], unreadable: &[Value]) -> Result<()> {
    let mut stored: Vec<Value> = dates
        .iter()
        .map(|day| Value::String(format_day_string(*day)))
        .collect();
    stored.extend_from_slice(unreadable);
    let encoded = serde_json::to_string(&stored).context("failed to encode non-billable dates")?;
    write_item(conn, keys::NON_BILLABLE_DATES, &encoded)
}

fn read_ignored_hours(conn: &Connection) -> Result<Decoded<IgnoredHoursEntry>> {
    Ok(decode_ignored_hours(
        read_item(conn, keys::IGNORED_HOURS)?.as_deref(),
    ))
}

fn write_ignored_hours(
    conn: &Connection,
    entries: &[IgnoredHoursEntry],
    unreadable: &[Value],
) -> Result<()> {
    let mut stored = Vec::with_capacity(entries.len() + unreadable.len());
    for entry in entries {
        stored.push(serde_json::to_value(entry).context("failed to encode ignored hours")?);
    }
    stored.extend_from_slice(unreadable);
    let encoded = serde_json::to_string(&stored).context("failed to encode ignored hours")?;
    write_item(conn, keys::IGNORED_HOURS, &encoded)
}

impl Database {
    /// Days marked "no work expected". Malformed storage reads as empty.
    pub async fn load_non_billable_dates(&self) -> Result<BTreeSet<NaiveDate>> {
        self.execute(|conn| Ok(read_non_billable(conn)?.items.into_iter().collect()))
            .await
    }

    /// Returns `false` when the day was already marked.
    pub async fn mark_non_billable(&self, day: NaiveDate) -> Result<bool> {
        self.execute(move |conn| {
            let tx = conn.transaction()?;
            let mut stored = read_non_billable(&tx)?;
            let inserted = insert_non_billable(&mut stored.items, day);
            if inserted {
                write_non_billable(&tx, &stored.items, &stored.unreadable)?;
            }
            tx.commit().context("failed to commit non-billable date")?;
            Ok(inserted)
        })
        .await
    }

    pub async fn reset_non_billable(&self) -> Result<()> {
        self.execute(|conn| write_non_billable(conn, &[], &[])).await
    }

    /// Ignored-hour entries in insertion order. Malformed storage reads as empty.
    pub async fn load_ignored_hours(&self) -> Result<Vec<IgnoredHoursEntry>> {
        self.execute(|conn| Ok(read_ignored_hours(conn)?.items)).await
    }

    /// Add `hours` to the day's entry (creating it if needed) and return the merged entry.
    pub async fn add_ignored_hours(&self, day: NaiveDate, hours: u32) -> Result<IgnoredHoursEntry> {
        self.execute(move |conn| {
            let tx = conn.transaction()?;
            let mut stored = read_ignored_hours(&tx)?;
            merge_ignored_hours(&mut stored.items, day, hours);
            write_ignored_hours(&tx, &stored.items, &stored.unreadable)?;
            tx.commit().context("failed to commit ignored hours")?;

            let merged = stored
                .items
                .into_iter()
                .find(|entry| entry.date == day)
                .unwrap_or(IgnoredHoursEntry { date: day, hours });
            Ok(merged)
        })
        .await
    }

    pub async fn reset_ignored_hours(&self) -> Result<()> {
        self.execute(|conn| write_ignored_hours(conn, &[], &[])).await
    }

    /// Both ledgers, read in a single task so they reflect the same moment.
    pub async fn load_ledger(&self) -> Result<IgnoreLedger> {
        self.execute(|conn| {
            Ok(IgnoreLedger {
                non_billable_dates: read_non_billable(conn)?.items.into_iter().collect(),
                ignored_hours: read_ignored_hours(conn)?.items,
            })
        })
        .await
    }

    pub async fn apply_ledger_command(&self, command: LedgerCommand) -> Result<()> {
        match command {
            LedgerCommand::IgnoreDay(day) => {
                if self.mark_non_billable(day).await? {
                    log_info!("Marked {} as non-billable.", format_day_string(day));
                } else {
                    log_debug!("{} was already non-billable", format_day_string(day));
                }
            }
            LedgerCommand::IgnoreHours(day, hours) => {
                let entry = self.add_ignored_hours(day, hours).await?;
                log_info!(
                    "Ignoring {hours}h shortfall on {} ({}h ignored in total)",
                    format_day_string(day),
                    entry.hours
                );
            }
            LedgerCommand::ResetNonBillable => {
                self.reset_non_billable().await?;
                log_info!("Cleared non-billable dates");
            }
            LedgerCommand::ResetIgnoredHours => {
                self.reset_ignored_hours().await?;
                log_info!("Cleared ignored hours");
            }
        }
        Ok(())
    }
}
