pub mod engine;
pub mod records;

pub use engine::{compute_findings, hours_by_date, Findings};
pub use records::{parse_records, RawRecord, WorkRecord};
