//! Schedule exceptions.
//!
//! An exception replaces the cyclic time interval either on one exact date
//! or on every occurrence of a weekday inside an optional validity window.
//! The two forms are separate variants of [`ExceptionRule`] so a record can
//! never carry both a date and a weekday.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Which dates an exception applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExceptionRule {
    /// Applies on exactly one calendar date.
    SpecificDate {
        /// The overridden date.
        date: NaiveDate,
    },
    /// Applies on every matching weekday within the validity window.
    Recurring {
        /// Weekday index, 0 = Sunday through 6 = Saturday.
        day_of_week: u8,
        /// First date the exception is valid (inclusive), unbounded if absent.
        #[serde(default)]
        valid_from: Option<NaiveDate>,
        /// Last date the exception is valid (inclusive), unbounded if absent.
        #[serde(default)]
        valid_to: Option<NaiveDate>,
    },
}

/// Precedence of a matched exception. Date-specific always wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExceptionPriority {
    /// Matched through a weekday rule.
    Recurring,
    /// Matched through an exact date.
    SpecificDate,
}

/// An override of the cyclic schedule.
///
/// # Example
///
/// ```
/// use attendance_engine::models::{ExceptionRule, ScheduleException};
/// use chrono::NaiveDate;
///
/// let json = r#"{
///     "id": "exc_1",
///     "employee_id": "emp_001",
///     "interval_id": "afternoon",
///     "created_at": "2024-01-02T09:00:00",
///     "type": "recurring",
///     "day_of_week": 1
/// }"#;
/// let exception: ScheduleException = serde_json::from_str(json).unwrap();
///
/// // 2024-01-08 is a Monday.
/// assert!(exception.applies_on(NaiveDate::from_ymd_opt(2024, 1, 8).unwrap()));
/// assert!(matches!(exception.rule, ExceptionRule::Recurring { .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleException {
    /// Unique identifier for the exception.
    pub id: String,
    /// The employee the exception belongs to.
    pub employee_id: String,
    /// Restricts the exception to one assignment; applies to all when absent.
    #[serde(default)]
    pub assignment_id: Option<String>,
    /// The replacement time interval.
    pub interval_id: String,
    /// When the exception was recorded; newer wins among conflicting rules.
    pub created_at: NaiveDateTime,
    /// Which dates the exception covers.
    #[serde(flatten)]
    pub rule: ExceptionRule,
}

impl ScheduleException {
    /// Priority this exception resolves with when it matches.
    pub fn priority(&self) -> ExceptionPriority {
        match self.rule {
            ExceptionRule::SpecificDate { .. } => ExceptionPriority::SpecificDate,
            ExceptionRule::Recurring { .. } => ExceptionPriority::Recurring,
        }
    }

    /// Returns true if the exception applies to the given employee and
    /// assignment.
    pub fn targets(&self, employee_id: &str, assignment_id: &str) -> bool {
        self.employee_id == employee_id
            && self
                .assignment_id
                .as_deref()
                .is_none_or(|id| id == assignment_id)
    }

    /// Returns true if the rule covers the given date.
    pub fn applies_on(&self, date: NaiveDate) -> bool {
        match &self.rule {
            ExceptionRule::SpecificDate { date: d } => *d == date,
            ExceptionRule::Recurring {
                day_of_week,
                valid_from,
                valid_to,
            } => {
                weekday_index(date) == *day_of_week
                    && valid_from.is_none_or(|from| date >= from)
                    && valid_to.is_none_or(|to| date <= to)
            }
        }
    }

    /// Checks the rule for internal consistency.
    pub fn validate(&self) -> EngineResult<()> {
        if let ExceptionRule::Recurring {
            day_of_week,
            valid_from,
            valid_to,
        } = &self.rule
        {
            if *day_of_week > 6 {
                return Err(EngineError::InvalidException {
                    exception_id: self.id.clone(),
                    message: format!("day of week {} outside 0..=6", day_of_week),
                });
            }
            if let (Some(from), Some(to)) = (valid_from, valid_to) {
                if to < from {
                    return Err(EngineError::InvalidException {
                        exception_id: self.id.clone(),
                        message: format!("validity ends {} before it starts {}", to, from),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Weekday index of a date, 0 = Sunday through 6 = Saturday.
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}
