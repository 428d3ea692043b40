use chrono::{Datelike, Local, NaiveDate};
use std::fmt;
use std::str::FromStr;

use crate::error::DairyError;

/// A calendar month, covering `[first day, first day of next month)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Month {
    start: NaiveDate,
}

impl Month {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|start| Self { start })
    }

    pub fn current() -> Self {
        Self::containing(Local::now().date_naive())
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            start: date.with_day(1).unwrap_or(date),
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// First day of the following month (exclusive bound).
    pub fn end(&self) -> NaiveDate {
        let (year, month) = if self.start.month() == 12 {
            (self.start.year() + 1, 1)
        } else {
            (self.start.year(), self.start.month() + 1)
        };
        NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MAX)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start() && date < self.end()
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.start.year(), self.start.month())
    }
}

impl FromStr for Month {
    type Err = DairyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DairyError::InvalidMonth(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Month::new(year, month).ok_or_else(invalid)
    }
}
