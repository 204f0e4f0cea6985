use chrono::{Datelike, Days, NaiveDate};

/// Days to step back from `today` to reach the Monday that opens its week.
/// Sunday closes the previous week, so it steps back six days.
fn days_since_monday(today: NaiveDate) -> u64 {
    match today.weekday().num_days_from_sunday() {
        0 => 6,
        dow => u64::from(dow - 1),
    }
}

pub fn week_start(today: NaiveDate) -> Option<NaiveDate> {
    today.checked_sub_days(Days::new(days_since_monday(today)))
}

/// Expected working days for "this week up to today".
///
/// Monday through `today` inclusive. On a Sunday the window is Monday through Saturday of the
/// week that just closed, so Saturday is included even though it is not a working day. The
/// same length rule includes Saturday when `today` is a Saturday.
pub fn current_week_window(today: NaiveDate) -> Vec<NaiveDate> {
    let length = match today.weekday().num_days_from_sunday() {
        0 => 6,
        dow => dow as usize,
    };

    match week_start(today) {
        Some(monday) => monday.iter_days().take(length).collect(),
        None => Vec::new(),
    }
}
