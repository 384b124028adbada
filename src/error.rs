//! Error types for the attendance engine.
//!
//! Every failure that can stop a resolution request is a variant of
//! [`EngineError`]. Apart from the two configuration-file variants, all of
//! them describe a configuration problem in the data handed to the engine
//! and carry the identifiers of the offending entities so callers can
//! surface them without re-reading the input.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The main error type for the attendance engine.
///
/// # Example
///
/// ```
/// use attendance_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/shifts.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/shifts.yaml");
/// assert_eq!(error.code(), "CONFIG_NOT_FOUND");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A cycle length of zero or less was used for day-index arithmetic.
    #[error("Invalid cycle length {cycle_length}: must be positive")]
    InvalidCycle {
        /// The rejected cycle length.
        cycle_length: i64,
    },

    /// A shift definition was invalid or internally inconsistent.
    #[error("Invalid shift '{shift_id}': {message}")]
    InvalidShift {
        /// The ID of the invalid shift.
        shift_id: String,
        /// A description of what made the shift invalid.
        message: String,
    },

    /// An assignment referenced a shift that is not in the catalog.
    #[error("Assignment '{assignment_id}' references unknown shift '{shift_id}'")]
    UnknownShift {
        /// The missing shift ID.
        shift_id: String,
        /// The assignment holding the dangling reference.
        assignment_id: String,
    },

    /// A shift day or exception referenced a time interval that does not exist.
    #[error("Unknown time interval '{interval_id}' referenced by '{referenced_by}'")]
    UnknownTimeInterval {
        /// The missing interval ID.
        interval_id: String,
        /// The shift or exception holding the dangling reference.
        referenced_by: String,
    },

    /// A time interval was invalid or internally inconsistent.
    #[error("Invalid time interval '{interval_id}': {message}")]
    InvalidTimeInterval {
        /// The ID of the invalid interval.
        interval_id: String,
        /// A description of what made the interval invalid.
        message: String,
    },

    /// A time-of-day string could not be parsed as `HH:MM` or `HH:MM:SS`.
    #[error("Malformed time of day '{value}' in '{entity}'")]
    MalformedTimeOfDay {
        /// The entity the value belongs to.
        entity: String,
        /// The raw value.
        value: String,
    },

    /// An assignment was internally inconsistent.
    #[error("Invalid assignment '{assignment_id}': {message}")]
    InvalidAssignment {
        /// The ID of the invalid assignment.
        assignment_id: String,
        /// A description of what made the assignment invalid.
        message: String,
    },

    /// Two assignments of the same employee cover the same date.
    #[error(
        "Overlapping assignments '{first}' and '{second}' for employee '{employee_id}' on {date}"
    )]
    OverlappingAssignments {
        /// The employee whose assignments overlap.
        employee_id: String,
        /// The earlier-starting assignment.
        first: String,
        /// The assignment that overlaps it.
        second: String,
        /// The first date covered by both.
        date: NaiveDate,
    },

    /// A schedule exception was internally inconsistent.
    #[error("Invalid exception '{exception_id}': {message}")]
    InvalidException {
        /// The ID of the invalid exception.
        exception_id: String,
        /// A description of what made the exception invalid.
        message: String,
    },

    /// An attendance row could not be read or violates the column contract.
    #[error("Malformed attendance row {row}: {message}")]
    MalformedRow {
        /// Identifies the row (index or employee/date key).
        row: String,
        /// A description of the problem.
        message: String,
    },

    /// A date range whose end precedes its start.
    #[error("Invalid date range: {start} is after {end}")]
    InvalidDateRange {
        /// The requested start date.
        start: NaiveDate,
        /// The requested end date.
        end: NaiveDate,
    },
}

impl EngineError {
    /// Returns a stable machine-readable code for the error.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::ConfigNotFound { .. } => "CONFIG_NOT_FOUND",
            EngineError::ConfigParseError { .. } => "CONFIG_PARSE_ERROR",
            EngineError::InvalidCycle { .. } => "INVALID_CYCLE",
            EngineError::InvalidShift { .. } => "INVALID_SHIFT",
            EngineError::UnknownShift { .. } => "UNKNOWN_SHIFT",
            EngineError::UnknownTimeInterval { .. } => "UNKNOWN_TIME_INTERVAL",
            EngineError::InvalidTimeInterval { .. } => "INVALID_TIME_INTERVAL",
            EngineError::MalformedTimeOfDay { .. } => "MALFORMED_TIME_OF_DAY",
            EngineError::InvalidAssignment { .. } => "INVALID_ASSIGNMENT",
            EngineError::OverlappingAssignments { .. } => "OVERLAPPING_ASSIGNMENTS",
            EngineError::InvalidException { .. } => "INVALID_EXCEPTION",
            EngineError::MalformedRow { .. } => "MALFORMED_ROW",
            EngineError::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
        }
    }

    /// Returns true for errors caused by the schedule data itself rather
    /// than by missing or unreadable configuration files.
    pub fn is_configuration_error(&self) -> bool {
        !matches!(
            self,
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. }
        )
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

/// Serializable projection of an [`EngineError`].
///
/// Used where a failure has to travel inside a result set, e.g. the
/// per-employee failures of a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureReport {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl FailureReport {
    /// Creates a new failure report.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new failure report with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }
}

impl From<&EngineError> for FailureReport {
    fn from(error: &EngineError) -> Self {
        match error {
            EngineError::OverlappingAssignments {
                employee_id, date, ..
            } => FailureReport::with_details(
                error.code(),
                error.to_string(),
                format!("Employee '{}' has more than one active assignment on {}", employee_id, date),
            ),
            EngineError::UnknownTimeInterval { referenced_by, .. } => FailureReport::with_details(
                error.code(),
                error.to_string(),
                format!("Fix the time interval reference on {}", referenced_by),
            ),
            _ => FailureReport::new(error.code(), error.to_string()),
        }
    }
}

impl From<EngineError> for FailureReport {
    fn from(error: EngineError) -> Self {
        FailureReport::from(&error)
    }
}
