//! Checker configuration data models.
//!
//! Configuration is threaded into every reconciliation run as a value; nothing reads it from
//! ambient state.

use serde::{Deserialize, Serialize};

pub const DEFAULT_WORKING_HOURS: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    /// Days billed below this many hours are reported as under-billed.
    pub working_hours_threshold: u32,
    /// Doubles as the "alert externally" flag handed to the notifier.
    pub notify_on_completion: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            working_hours_threshold: DEFAULT_WORKING_HOURS,
            notify_on_completion: false,
        }
    }
}

/// Validation for user-supplied and stored configuration values
pub mod validation {
    use thiserror::Error;

    #[derive(Debug, Clone, PartialEq, Eq, Error)]
    pub enum ConfigError {
        #[error("working hours must be a positive whole number, got '{0}'")]
        InvalidThreshold(String),
        #[error("notification flag must be 'true' or 'false', got '{0}'")]
        InvalidFlag(String),
    }

    pub fn parse_working_hours(input: &str) -> Result<u32, ConfigError> {
        let trimmed = input.trim();
        match trimmed.parse::<u32>() {
            Ok(hours) if hours > 0 => Ok(hours),
            _ => Err(ConfigError::InvalidThreshold(trimmed.to_string())),
        }
    }

    pub fn parse_flag(input: &str) -> Result<bool, ConfigError> {
        match input.trim() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(ConfigError::InvalidFlag(other.to_string())),
        }
    }
}
