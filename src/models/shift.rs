//! Shift definitions and employee assignments.
//!
//! A [`ShiftDefinition`] is a repeating cycle of day positions, each bound
//! to a time interval. An [`Assignment`] attaches an employee to a shift
//! from a start date, optionally up to an end date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Unit in which a shift's cycle length is expressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleUnit {
    /// The cycle length counts days.
    #[default]
    Day,
    /// The cycle length counts weeks (7 days each).
    Week,
}

impl CycleUnit {
    /// Number of days in one unit.
    pub fn days(self) -> i64 {
        match self {
            CycleUnit::Day => 1,
            CycleUnit::Week => 7,
        }
    }
}

/// One position of a shift cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleDay {
    /// Zero-based position within the cycle.
    pub day_index: u32,
    /// Time interval worked at this position, if any.
    #[serde(default)]
    pub interval_id: Option<String>,
    /// Whether this position is a scheduled day off.
    #[serde(default)]
    pub day_off: bool,
}

/// A repeating shift pattern.
///
/// # Example
///
/// ```
/// use attendance_engine::models::{CycleDay, CycleUnit, ShiftDefinition};
///
/// let shift = ShiftDefinition {
///     id: "rotating".to_string(),
///     name: "Two-week rotation".to_string(),
///     cycle_length: 2,
///     cycle_unit: CycleUnit::Week,
///     days: vec![CycleDay {
///         day_index: 0,
///         interval_id: Some("morning".to_string()),
///         day_off: false,
///     }],
///     works_weekends: false,
///     works_days_off: false,
/// };
///
/// assert_eq!(shift.cycle_days(), 14);
/// assert_eq!(shift.interval_at(0), Some("morning"));
/// assert_eq!(shift.interval_at(1), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftDefinition {
    /// Unique identifier for the shift.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Length of the cycle, in `cycle_unit`s.
    pub cycle_length: i64,
    /// Unit of `cycle_length`.
    #[serde(default)]
    pub cycle_unit: CycleUnit,
    /// Cycle positions, ordered by day index.
    #[serde(default)]
    pub days: Vec<CycleDay>,
    /// Whether Saturdays and Sundays are worked.
    #[serde(default)]
    pub works_weekends: bool,
    /// Whether positions flagged as day off are worked.
    #[serde(default)]
    pub works_days_off: bool,
}

impl ShiftDefinition {
    /// Effective cycle length in days.
    pub fn cycle_days(&self) -> i64 {
        self.cycle_length * self.cycle_unit.days()
    }

    /// Returns the cycle position with the given index.
    pub fn day(&self, day_index: u32) -> Option<&CycleDay> {
        self.days.iter().find(|d| d.day_index == day_index)
    }

    /// Returns the interval bound to the given position, if any.
    pub fn interval_at(&self, day_index: u32) -> Option<&str> {
        self.day(day_index).and_then(|d| d.interval_id.as_deref())
    }

    /// Checks the cycle for internal consistency.
    ///
    /// The cycle length must be positive and every position must lie within
    /// the cycle and appear at most once.
    pub fn validate(&self) -> EngineResult<()> {
        let invalid = |message: String| EngineError::InvalidShift {
            shift_id: self.id.clone(),
            message,
        };

        if self.cycle_length <= 0 {
            return Err(invalid(format!(
                "cycle length must be positive, got {}",
                self.cycle_length
            )));
        }

        let cycle_days = self.cycle_days();
        let mut seen = std::collections::HashSet::new();
        for day in &self.days {
            if i64::from(day.day_index) >= cycle_days {
                return Err(invalid(format!(
                    "day index {} outside cycle of {} days",
                    day.day_index, cycle_days
                )));
            }
            if !seen.insert(day.day_index) {
                return Err(invalid(format!("day index {} declared twice", day.day_index)));
            }
        }

        Ok(())
    }
}

/// Attaches an employee to a shift over a date span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Unique identifier for the assignment.
    pub id: String,
    /// The employee being assigned.
    pub employee_id: String,
    /// The shift the employee works.
    pub shift_id: String,
    /// First covered date (inclusive). Also the cycle's day 0.
    pub start_date: NaiveDate,
    /// Last covered date (inclusive); `None` means open-ended.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl Assignment {
    /// Checks if the assignment covers the given date.
    pub fn covers(&self, date: NaiveDate) -> bool {
        date >= self.start_date && self.end_date.is_none_or(|end| date <= end)
    }

    /// First date covered by both assignments, if they overlap.
    pub fn first_overlap(&self, other: &Assignment) -> Option<NaiveDate> {
        let start = self.start_date.max(other.start_date);
        let end = match (self.end_date, other.end_date) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (Some(a), None) => Some(a),
            (None, Some(b)) => Some(b),
            (None, None) => None,
        };
        match end {
            Some(end) if end < start => None,
            _ => Some(start),
        }
    }

    /// Rejects an end date before the start date.
    pub fn validate(&self) -> EngineResult<()> {
        match self.end_date {
            Some(end) if end < self.start_date => Err(EngineError::InvalidAssignment {
                assignment_id: self.id.clone(),
                message: format!("end date {} is before start date {}", end, self.start_date),
            }),
            _ => Ok(()),
        }
    }
}
