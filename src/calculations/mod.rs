pub mod backward_pass;
pub mod forward_pass;

use chrono::NaiveDate;
use std::collections::HashMap;

use crate::TaskId;
use crate::calendar::WorkCalendar;

/// (start, finish) per task.
pub type DateMap = HashMap<TaskId, (NaiveDate, NaiveDate)>;

fn finish_from_start(calendar: &WorkCalendar, start: NaiveDate, duration: i64) -> Option<NaiveDate> {
    if duration <= 0 {
        Some(start)
    } else {
        calendar.shift(start, duration - 1)
    }
}

fn start_from_finish(calendar: &WorkCalendar, finish: NaiveDate, duration: i64) -> Option<NaiveDate> {
    if duration <= 0 {
        Some(finish)
    } else {
        calendar.shift(finish, -(duration - 1))
    }
}

/// Exact offset without rolling a zero shift onto the next working day.
fn offset(calendar: &WorkCalendar, date: NaiveDate, days: i64) -> Option<NaiveDate> {
    if days == 0 {
        Some(date)
    } else {
        calendar.shift(date, days)
    }
}
