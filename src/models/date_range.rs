//! Inclusive calendar date ranges.
//!
//! This module contains the [`DateRange`] type used to bound every
//! resolution and summary request.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// An inclusive range of calendar dates.
///
/// # Example
///
/// ```
/// use attendance_engine::models::DateRange;
/// use chrono::NaiveDate;
///
/// let range = DateRange::new(
///     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2024, 1, 7).unwrap(),
/// )
/// .unwrap();
///
/// assert_eq!(range.len(), 7);
/// assert!(range.contains_date(NaiveDate::from_ymd_opt(2024, 1, 7).unwrap()));
/// assert!(!range.contains_date(NaiveDate::from_ymd_opt(2024, 1, 8).unwrap()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    /// The first date of the range (inclusive).
    pub start_date: NaiveDate,
    /// The last date of the range (inclusive).
    pub end_date: NaiveDate,
}

impl DateRange {
    /// Creates a range, rejecting an end date before the start date.
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> EngineResult<Self> {
        if end_date < start_date {
            return Err(EngineError::InvalidDateRange {
                start: start_date,
                end: end_date,
            });
        }
        Ok(Self {
            start_date,
            end_date,
        })
    }

    /// A range covering a single date.
    pub fn single(date: NaiveDate) -> Self {
        Self {
            start_date: date,
            end_date: date,
        }
    }

    /// Checks if a given date falls within this range (inclusive).
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Number of calendar days in the range. Zero for an inverted range.
    pub fn len(&self) -> usize {
        let days = (self.end_date - self.start_date).num_days() + 1;
        days.max(0) as usize
    }

    /// Returns true if the range holds no dates.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over every date in the range, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        let end = self.end_date;
        std::iter::successors(Some(self.start_date), |d| d.checked_add_days(Days::new(1)))
            .take_while(move |d| *d <= end)
    }

    /// Returns the overlap of two ranges, if any.
    pub fn intersect(&self, other: &DateRange) -> Option<DateRange> {
        let start = self.start_date.max(other.start_date);
        let end = self.end_date.min(other.end_date);
        (start <= end).then_some(DateRange {
            start_date: start,
            end_date: end,
        })
    }
}
