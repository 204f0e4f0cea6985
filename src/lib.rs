pub mod calendar;
pub mod checker;
pub mod cli;
pub mod db;
pub mod notifier;
pub mod reconciliation;
mod utils;

use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::{anyhow, Context};
use log::error;

pub use checker::{CheckReport, ComplianceChecker, JsonFileSource, RecordSource};
use checker::commands::{
    check_timesheet, get_configuration, get_ledger, ignore_day, ignore_hours,
    reset_ignored_hours, reset_non_billable, save_configuration,
};
use cli::{CliCommand, USAGE};
pub use db::Database;
use notifier::LogNotifier;

const DATA_DIR_ENV: &str = "TIMESHEET_GUARD_DATA_DIR";
const DB_FILE_NAME: &str = "timesheet-guard.sqlite3";

/// Session-wide state: the ledger/configuration store and the checker bound to it.
pub struct GuardState {
    pub db: Database,
    pub checker: ComplianceChecker,
}

impl GuardState {
    pub fn open(data_dir: PathBuf) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&data_dir).with_context(|| {
            format!("failed to create data directory {}", data_dir.display())
        })?;

        let db = Database::new(data_dir.join(DB_FILE_NAME))?;
        let checker = ComplianceChecker::new(db.clone(), Arc::new(LogNotifier::default()));
        Ok(Self { db, checker })
    }
}

fn resolve_data_dir() -> anyhow::Result<PathBuf> {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    dirs::data_dir()
        .map(|dir| dir.join("timesheet-guard"))
        .ok_or_else(|| anyhow!("no data directory available; set {DATA_DIR_ENV}"))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| e.to_string())
}

async fn dispatch(state: &GuardState, command: CliCommand) -> Result<String, String> {
    match command {
        CliCommand::Check {
            records,
            today,
            settle_delay,
        } => {
            let source: Arc<dyn RecordSource> = Arc::new(JsonFileSource::new(records));
            let report = check_timesheet(state, source, settle_delay, today).await?;
            to_json(&report)
        }
        CliCommand::IgnoreDay { day } => {
            let day = ignore_day(state, &day).await?;
            Ok(format!(
                "Marked {} as non-billable.",
                calendar::format_day_string(day)
            ))
        }
        CliCommand::IgnoreHours { day, hours } => {
            let (day, hours) = ignore_hours(state, &day, &hours).await?;
            Ok(format!(
                "Ignored {hours}h on {}.",
                calendar::format_day_string(day)
            ))
        }
        CliCommand::ResetDays => {
            reset_non_billable(state).await?;
            Ok("Cleared non-billable dates.".to_string())
        }
        CliCommand::ResetHours => {
            reset_ignored_hours(state).await?;
            Ok("Cleared ignored hours.".to_string())
        }
        CliCommand::Ledger => to_json(&get_ledger(state).await?),
        CliCommand::ShowConfig => to_json(&get_configuration(state).await?),
        CliCommand::SaveConfig {
            working_hours,
            notify_on_completion,
        } => to_json(&save_configuration(state, &working_hours, &notify_on_completion).await?),
        CliCommand::Help => Ok(USAGE.to_string()),
    }
}

pub fn run() -> ExitCode {
    // Initialize logging (RUST_LOG overrides the default level)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let command = match cli::parse_args(std::env::args().skip(1)) {
        Ok(command) => command,
        Err(message) => {
            eprintln!("{message}\n\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            error!("Failed to start async runtime: {err}");
            return ExitCode::FAILURE;
        }
    };

    let result = runtime.block_on(async move {
        let data_dir = resolve_data_dir()?;
        let state = GuardState::open(data_dir)?;
        dispatch(&state, command).await.map_err(|e| anyhow!(e))
    });

    match result {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err:#}");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
