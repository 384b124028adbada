//! Resolved schedule days.
//!
//! A [`ResolvedDay`] is the concrete schedule for one employee on one date:
//! which interval applies, where it came from, and the absolute timestamps
//! punches are measured against.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::{ExceptionPriority, TimeInterval};

/// How a day's schedule was determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    /// An interval applies, from the cycle or an exception.
    Scheduled,
    /// A rest day (weekend or day off not worked).
    Rest,
    /// No interval, no exception and no rest flag: a gap in the data.
    Unresolved,
}

/// The exception that replaced the cyclic interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedException {
    /// The exception's ID.
    pub exception_id: String,
    /// Whether it matched by exact date or by weekday.
    pub priority: ExceptionPriority,
}

/// Absolute punch-window boundaries for one scheduled day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PunchWindows {
    /// Earliest accepted entry punch.
    pub entry_from: NaiveDateTime,
    /// Latest accepted entry punch.
    pub entry_to: NaiveDateTime,
    /// Earliest accepted exit punch.
    pub exit_from: NaiveDateTime,
    /// Latest accepted exit punch.
    pub exit_to: NaiveDateTime,
}

impl PunchWindows {
    /// Returns true if `t` lies in the entry window (inclusive).
    pub fn in_entry(&self, t: NaiveDateTime) -> bool {
        t >= self.entry_from && t <= self.entry_to
    }

    /// Returns true if `t` lies in the exit window (inclusive).
    pub fn in_exit(&self, t: NaiveDateTime) -> bool {
        t >= self.exit_from && t <= self.exit_to
    }

    /// Returns true if `t` lies anywhere between the start of the entry
    /// window and the end of the exit window.
    pub fn in_span(&self, t: NaiveDateTime) -> bool {
        t >= self.entry_from && t <= self.exit_to
    }
}

/// Expected timestamps for a scheduled day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedTimes {
    /// Expected entry: the date plus the interval's entry time.
    pub entry: NaiveDateTime,
    /// Expected exit: entry plus duration, possibly on the next date.
    pub exit: NaiveDateTime,
    /// Punch windows around entry and exit.
    pub windows: PunchWindows,
}

/// The schedule in effect for one employee on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedDay {
    /// The employee.
    pub employee_id: String,
    /// The assignment the day was resolved from.
    pub assignment_id: String,
    /// The assignment's shift.
    pub shift_id: String,
    /// The calendar date.
    pub date: NaiveDate,
    /// Position within the shift cycle.
    pub day_index: u32,
    /// How the schedule was determined.
    pub status: DayStatus,
    /// The interval in effect; `None` on rest and unresolved days.
    pub interval: Option<TimeInterval>,
    /// True if an exception replaced the cyclic interval.
    pub is_exception: bool,
    /// The exception applied, when `is_exception` is true.
    pub exception: Option<AppliedException>,
    /// Expected timestamps; `None` when no interval applies.
    pub expected: Option<ExpectedTimes>,
}

impl ResolvedDay {
    /// Returns true for a rest day.
    pub fn is_rest(&self) -> bool {
        self.status == DayStatus::Rest
    }

    /// Returns true for a day with a gap in the schedule data.
    pub fn is_unresolved(&self) -> bool {
        self.status == DayStatus::Unresolved
    }

    /// Punch windows, when the day is scheduled.
    pub fn windows(&self) -> Option<&PunchWindows> {
        self.expected.as_ref().map(|e| &e.windows)
    }
}
