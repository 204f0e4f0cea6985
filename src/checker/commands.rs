use std::{sync::Arc, time::Duration};

use chrono::NaiveDate;

use crate::{
    calendar::parse_day,
    db::{models::configuration::validation::parse_flag, Configuration, IgnoreLedger, LedgerCommand},
    GuardState,
};

use super::{controller::CheckReport, source::RecordSource};

fn parse_day_arg(text: &str) -> Result<NaiveDate, String> {
    parse_day(text).map_err(|e| e.to_string())
}

pub async fn check_timesheet(
    state: &GuardState,
    source: Arc<dyn RecordSource>,
    settle_delay: Duration,
    today: Option<NaiveDate>,
) -> Result<CheckReport, String> {
    state
        .checker
        .schedule_check(source, settle_delay, today)
        .await
        .map_err(|e| format!("check task failed: {e}"))
}

pub async fn ignore_day(state: &GuardState, day: &str) -> Result<NaiveDate, String> {
    let day = parse_day_arg(day)?;
    state
        .checker
        .apply(LedgerCommand::IgnoreDay(day))
        .await
        .map_err(|e| e.to_string())?;
    Ok(day)
}

pub async fn ignore_hours(
    state: &GuardState,
    day: &str,
    hours: &str,
) -> Result<(NaiveDate, u32), String> {
    let day = parse_day_arg(day)?;
    let hours: u32 = hours
        .trim()
        .parse()
        .map_err(|_| format!("hours must be a whole number, got '{}'", hours.trim()))?;
    state
        .checker
        .apply(LedgerCommand::IgnoreHours(day, hours))
        .await
        .map_err(|e| e.to_string())?;
    Ok((day, hours))
}

pub async fn reset_non_billable(state: &GuardState) -> Result<(), String> {
    state
        .checker
        .apply(LedgerCommand::ResetNonBillable)
        .await
        .map_err(|e| e.to_string())
}

pub async fn reset_ignored_hours(state: &GuardState) -> Result<(), String> {
    state
        .checker
        .apply(LedgerCommand::ResetIgnoredHours)
        .await
        .map_err(|e| e.to_string())
}

pub async fn get_ledger(state: &GuardState) -> Result<IgnoreLedger, String> {
    state.db.load_ledger().await.map_err(|e| e.to_string())
}

pub async fn get_configuration(state: &GuardState) -> Result<Configuration, String> {
    state.db.load_configuration().await.map_err(|e| e.to_string())
}

pub async fn save_configuration(
    state: &GuardState,
    working_hours: &str,
    notify_on_completion: &str,
) -> Result<Configuration, String> {
    let notify_on_completion = parse_flag(notify_on_completion).map_err(|e| e.to_string())?;
    state
        .db
        .save_configuration(working_hours, notify_on_completion)
        .await
        .map_err(|e| e.to_string())
}
