pub mod configuration;
pub mod ledger;

pub use configuration::{validation::ConfigError, Configuration, DEFAULT_WORKING_HOURS};
pub use ledger::{IgnoreLedger, IgnoredHoursEntry, LedgerCommand};

/// Storage keys, shared with the host page's own storage layout.
pub mod keys {
    pub const NON_BILLABLE_DATES: &str = "nonBillableDates";
    pub const IGNORED_HOURS: &str = "ignoredHours";
    pub const WORKING_HOURS: &str = "workingHours";
    pub const SEND_END_OF_DAY_NOTIFICATION: &str = "sendEndOfDayNotification";
}
