pub mod day;
pub mod window;

pub use day::{format_day_string, parse_day, DayParseError};
pub use window::{current_week_window, week_start};
