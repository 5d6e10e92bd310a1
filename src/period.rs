//! Reporting periods and date ranges.
//!
//! Storage filters by date before anything is summarized, so these types
//! are what the dashboard and the transactions screen hand to the store.

use chrono::{Datelike, Days, Local, Months, NaiveDate};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PeriodError {
    #[error("invalid month '{0}' (expected YYYY-MM)")]
    InvalidMonth(String),
    #[error("invalid date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),
    #[error("invalid range: {start} is after {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
    #[error("range of {days} days is too long (at most {max})", max = MAX_RANGE_DAYS)]
    RangeTooLong { days: i64 },
}

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReportingPeriod {
    first_day: NaiveDate,
}

impl ReportingPeriod {
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first_day: date.with_day(1).unwrap_or(date),
        }
    }

    pub fn current() -> Self {
        Self::containing(Local::now().date_naive())
    }

    pub fn from_ym(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first_day| Self { first_day })
    }

    /// Parse `YYYY-MM`.
    pub fn parse(s: &str) -> Result<Self, PeriodError> {
        let trimmed = s.trim();
        NaiveDate::parse_from_str(&format!("{trimmed}-01"), "%Y-%m-%d")
            .map(Self::containing)
            .map_err(|_| PeriodError::InvalidMonth(trimmed.to_string()))
    }

    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    pub fn month(&self) -> u32 {
        self.first_day.month()
    }

    pub fn start(&self) -> NaiveDate {
        self.first_day
    }

    /// Last day of the month.
    pub fn end(&self) -> NaiveDate {
        self.first_day
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(self.first_day)
    }

    pub fn range(&self) -> DateRange {
        DateRange {
            start: self.start(),
            end: self.end(),
        }
    }

    pub fn prev(&self) -> Self {
        self.first_day
            .checked_sub_months(Months::new(1))
            .map(Self::containing)
            .unwrap_or(*self)
    }

    pub fn next(&self) -> Self {
        self.first_day
            .checked_add_months(Months::new(1))
            .map(Self::containing)
            .unwrap_or(*self)
    }

    /// e.g. "March 2024".
    pub fn label(&self) -> String {
        self.first_day.format("%B %Y").to_string()
    }
}

impl std::fmt::Display for ReportingPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.first_day.format("%Y-%m"))
    }
}

/// Longest range the transactions view accepts; the chart has one column per day.
pub const MAX_RANGE_DAYS: i64 = 366;

/// Inclusive date range, at most `MAX_RANGE_DAYS` long.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, PeriodError> {
        if start > end {
            return Err(PeriodError::InvalidRange { start, end });
        }
        let days = (end - start).num_days() + 1;
        if days > MAX_RANGE_DAYS {
            return Err(PeriodError::RangeTooLong { days });
        }
        Ok(Self { start, end })
    }

    /// First of `today`'s month through `today`.
    pub fn month_to_date(today: NaiveDate) -> Self {
        Self {
            start: ReportingPeriod::containing(today).start(),
            end: today,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of days, both ends included.
    pub fn len_days(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        std::iter::successors(Some(self.start), move |d| {
            d.checked_add_days(Days::new(1)).filter(|next| *next <= end)
        })
    }

    pub fn with_start(&self, start: NaiveDate) -> Result<Self, PeriodError> {
        Self::new(start, self.end)
    }

    pub fn with_end(&self, end: NaiveDate) -> Result<Self, PeriodError> {
        Self::new(self.start, end)
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} .. {}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

/// Parse `YYYY-MM-DD`.
pub fn parse_date(s: &str) -> Result<NaiveDate, PeriodError> {
    let trimmed = s.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|_| PeriodError::InvalidDate(trimmed.to_string()))
}

#[cfg(test)]
#[path = "period_tests.rs"]
mod tests;
