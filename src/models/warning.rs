//! Non-fatal warnings attached to results.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The kind of condition a warning reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarningCode {
    /// Several exceptions of the same priority matched one date; the most
    /// recently created one was applied.
    ConflictingExceptions,
    /// A date had no interval, exception or rest flag.
    UnresolvedDay,
    /// More than one entry-type record exists for one date, so the day may
    /// be a split shift the summary does not model.
    MultipleEntryRecords,
}

/// A condition that did not stop the computation but that callers should
/// surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionWarning {
    /// What kind of condition was found.
    pub code: WarningCode,
    /// The employee concerned.
    pub employee_id: String,
    /// The date concerned.
    pub date: NaiveDate,
    /// A human-readable description.
    pub message: String,
    /// IDs of the records involved (exceptions, rows, ...).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_ids: Vec<String>,
}
