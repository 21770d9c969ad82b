//! Calendar period tags used to detect day, ISO-week and month rollovers.

use chrono::{Datelike, Local, NaiveDate};

/// Tags for the day, ISO week and month containing a date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Periods {
    /// `YYYY-MM-DD`
    pub day: String,
    /// `YYYY-WW` (ISO week-numbering year and week)
    pub week: String,
    /// `YYYY-MM`
    pub month: String,
}

/// Compute the period tags of `date`.
///
/// The week tag uses the ISO-8601 week-numbering year, so dates close to
/// January 1st may carry the neighbouring year.
pub fn periods(date: NaiveDate) -> Periods {
    let iso = date.iso_week();
    Periods {
        day: date.format("%Y-%m-%d").to_string(),
        week: format!("{}-{:02}", iso.year(), iso.week()),
        month: date.format("%Y-%m").to_string(),
    }
}

/// Source of the evaluation date.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local calendar date of the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock pinned to one date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
