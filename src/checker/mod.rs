pub mod commands;
pub mod controller;
pub mod source;

pub use controller::{CheckReport, ComplianceChecker, DEFAULT_SETTLE_DELAY};
pub use source::{JsonFileSource, RecordSource};
