use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::config::ConfigError;

/// Working-day calendar used for every date offset in the engine.
///
/// The default calendar treats all seven weekdays as working and has no
/// holidays, so offsets are plain calendar days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkCalendar {
    holidays: HashSet<NaiveDate>,
    non_working_days: HashSet<Weekday>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkCalendarConfig {
    #[serde(default = "WorkCalendarConfig::all_weekdays")]
    working_days: Vec<Weekday>,
    #[serde(default)]
    holidays: Vec<NaiveDate>,
}

impl Default for WorkCalendar {
    fn default() -> Self {
        Self {
            holidays: HashSet::new(),
            non_working_days: HashSet::new(),
        }
    }
}

impl WorkCalendar {
    const ALL_WEEKDAYS: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    /// Monday to Friday working week without holidays.
    pub fn five_day_week() -> Self {
        Self {
            holidays: HashSet::new(),
            non_working_days: HashSet::from([Weekday::Sat, Weekday::Sun]),
        }
    }

    pub fn custom<I, J>(working_days: I, holidays: J) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = Weekday>,
        J: IntoIterator<Item = NaiveDate>,
    {
        let config = WorkCalendarConfig::new(working_days, holidays);
        Self::from_config(&config)
    }

    pub fn from_config(config: &WorkCalendarConfig) -> Result<Self, ConfigError> {
        let working_set: HashSet<Weekday> = config.working_days.iter().copied().collect();
        if working_set.is_empty() {
            return Err(ConfigError::Invalid(
                "calendar requires at least one working day".to_string(),
            ));
        }
        let non_working_days = Self::ALL_WEEKDAYS
            .into_iter()
            .filter(|day| !working_set.contains(day))
            .collect();

        Ok(Self {
            holidays: config.holidays.iter().copied().collect(),
            non_working_days,
        })
    }

    pub fn to_config(&self) -> WorkCalendarConfig {
        WorkCalendarConfig::from(self)
    }

    pub fn add_holiday(&mut self, date: NaiveDate) {
        self.holidays.insert(date);
    }

    pub fn add_holidays(&mut self, dates: &[NaiveDate]) {
        self.holidays.extend(dates);
    }

    pub fn is_available(&self, date: NaiveDate) -> bool {
        !self.holidays.contains(&date) && !self.non_working_days.contains(&date.weekday())
    }

    fn every_day_available(&self) -> bool {
        self.holidays.is_empty() && self.non_working_days.is_empty()
    }

    /// First available date strictly after `from`.
    pub fn next_available(&self, from: NaiveDate) -> Option<NaiveDate> {
        let mut current = from.succ_opt()?;
        while !self.is_available(current) {
            current = current.succ_opt()?;
        }
        Some(current)
    }

    /// Last available date strictly before `from`.
    pub fn prev_available(&self, from: NaiveDate) -> Option<NaiveDate> {
        let mut current = from.pred_opt()?;
        while !self.is_available(current) {
            current = current.pred_opt()?;
        }
        Some(current)
    }

    /// Move `days` available days forward (positive) or backward (negative).
    ///
    /// A zero shift rolls an unavailable date forward to the next available
    /// one. Returns `None` when the result leaves chrono's date range.
    pub fn shift(&self, from: NaiveDate, days: i64) -> Option<NaiveDate> {
        if days == 0 {
            return if self.is_available(from) {
                Some(from)
            } else {
                self.next_available(from)
            };
        }
        if self.every_day_available() {
            return from.checked_add_signed(Duration::try_days(days)?);
        }
        // Larger shifts always leave chrono's date range.
        if days.unsigned_abs() > (NaiveDate::MAX - NaiveDate::MIN).num_days().unsigned_abs() {
            return None;
        }

        let mut current = from;
        for _ in 0..days.unsigned_abs() {
            current = if days > 0 {
                self.next_available(current)?
            } else {
                self.prev_available(current)?
            };
        }
        Some(current)
    }

    /// Signed count of available days in `(from, to]`, negated when `to < from`.
    ///
    /// Inverse of [`WorkCalendar::shift`] for available dates:
    /// `working_days_between(d, shift(d, n)) == n`.
    pub fn working_days_between(&self, from: NaiveDate, to: NaiveDate) -> i64 {
        if self.every_day_available() {
            return (to - from).num_days();
        }
        let (lo, hi, sign) = if from <= to { (from, to, 1) } else { (to, from, -1) };
        let mut count = 0;
        let mut current = lo;
        while current < hi {
            current = match current.succ_opt() {
                Some(next) => next,
                None => break,
            };
            if self.is_available(current) {
                count += 1;
            }
        }
        sign * count
    }

    /// Count available days in the inclusive range `[start, end]`.
    pub fn count_available_days(&self, start: NaiveDate, end: NaiveDate) -> i64 {
        let mut count = 0;
        let mut current = start;
        while current <= end {
            if self.is_available(current) {
                count += 1;
            }
            current = match current.succ_opt() {
                Some(next) => next,
                None => break,
            };
        }
        count
    }
}

impl WorkCalendarConfig {
    pub fn new<I, J>(working_days: I, holidays: J) -> Self
    where
        I: IntoIterator<Item = Weekday>,
        J: IntoIterator<Item = NaiveDate>,
    {
        let mut working: Vec<Weekday> = working_days.into_iter().collect();
        working.sort_by_key(|wd| wd.num_days_from_monday());
        working.dedup_by(|a, b| a.num_days_from_monday() == b.num_days_from_monday());

        let mut holidays: Vec<NaiveDate> = holidays.into_iter().collect();
        holidays.sort();
        holidays.dedup();

        Self {
            working_days: working,
            holidays,
        }
    }

    fn all_weekdays() -> Vec<Weekday> {
        WorkCalendar::ALL_WEEKDAYS.to_vec()
    }

    pub fn working_days(&self) -> &[Weekday] {
        &self.working_days
    }

    pub fn holidays(&self) -> &[NaiveDate] {
        &self.holidays
    }
}

impl Default for WorkCalendarConfig {
    fn default() -> Self {
        WorkCalendarConfig::from(&WorkCalendar::default())
    }
}

impl From<&WorkCalendar> for WorkCalendarConfig {
    fn from(calendar: &WorkCalendar) -> Self {
        let working: Vec<Weekday> = WorkCalendar::ALL_WEEKDAYS
            .into_iter()
            .filter(|day| !calendar.non_working_days.contains(day))
            .collect();

        let mut holidays: Vec<NaiveDate> = calendar.holidays.iter().copied().collect();
        holidays.sort();

        Self {
            working_days: working,
            holidays,
        }
    }
}
