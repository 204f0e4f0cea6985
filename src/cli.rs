use std::{path::PathBuf, time::Duration};

use chrono::NaiveDate;

use crate::{calendar::parse_day, checker::DEFAULT_SETTLE_DELAY};

pub const USAGE: &str = "\
usage:
  timesheet-guard check <records.json> [--today <day>] [--settle | --settle-ms <ms>]
  timesheet-guard ignore-day <day>
  timesheet-guard ignore-hours <day> <hours>
  timesheet-guard reset-days
  timesheet-guard reset-hours
  timesheet-guard ledger
  timesheet-guard config [<working-hours> <true|false>]

Days may be written as 2026-10-14, Oct 14, 2026 or Wed Oct 14 2026.
Set TIMESHEET_GUARD_DATA_DIR to choose where the ledger is stored.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    Check {
        records: PathBuf,
        today: Option<NaiveDate>,
        settle_delay: Duration,
    },
    IgnoreDay {
        day: String,
    },
    IgnoreHours {
        day: String,
        hours: String,
    },
    ResetDays,
    ResetHours,
    Ledger,
    ShowConfig,
    SaveConfig {
        working_hours: String,
        notify_on_completion: String,
    },
    Help,
}

fn parse_check<I>(mut args: I) -> Result<CliCommand, String>
where
    I: Iterator<Item = String>,
{
    let mut records = None;
    let mut today = None;
    // Exported rows are already complete, so the CLI does not wait unless asked to.
    let mut settle_delay = Duration::ZERO;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--today" => {
                let value = args.next().ok_or("--today needs a day")?;
                today = Some(parse_day(&value).map_err(|e| e.to_string())?);
            }
            "--settle" => settle_delay = DEFAULT_SETTLE_DELAY,
            "--settle-ms" => {
                let value = args.next().ok_or("--settle-ms needs a value")?;
                let millis: u64 = value
                    .parse()
                    .map_err(|_| format!("--settle-ms expects milliseconds, got '{value}'"))?;
                settle_delay = Duration::from_millis(millis);
            }
            flag if flag.starts_with("--") => return Err(format!("unknown option '{flag}'")),
            _ if records.is_none() => records = Some(PathBuf::from(arg.clone())),
            _ => return Err(format!("unexpected argument '{arg}'")),
        }
    }

    Ok(CliCommand::Check {
        records: records.ok_or("check needs a records file")?,
        today,
        settle_delay,
    })
}

pub fn parse_args<I>(args: I) -> Result<CliCommand, String>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let Some(command) = args.next() else {
        return Ok(CliCommand::Help);
    };

    let rest: Vec<String> = match command.as_str() {
        "check" => return parse_check(args),
        _ => args.collect(),
    };

    match (command.as_str(), rest.as_slice()) {
        ("ignore-day", [day]) => Ok(CliCommand::IgnoreDay { day: day.clone() }),
        ("ignore-hours", [day, hours]) => Ok(CliCommand::IgnoreHours {
            day: day.clone(),
            hours: hours.clone(),
        }),
        ("reset-days", []) => Ok(CliCommand::ResetDays),
        ("reset-hours", []) => Ok(CliCommand::ResetHours),
        ("ledger", []) => Ok(CliCommand::Ledger),
        ("config", []) => Ok(CliCommand::ShowConfig),
        ("config", [working_hours, notify_on_completion]) => Ok(CliCommand::SaveConfig {
            working_hours: working_hours.clone(),
            notify_on_completion: notify_on_completion.clone(),
        }),
        ("help" | "--help" | "-h", _) => Ok(CliCommand::Help),
        (
            "ignore-day" | "ignore-hours" | "reset-days" | "reset-hours" | "ledger" | "config",
            _,
        ) => Err(format!("wrong number of arguments for '{command}'")),
        _ => Err(format!("unknown command '{command}'")),
    }
}
