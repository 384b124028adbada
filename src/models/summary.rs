//! Per-employee attendance summaries.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ResolutionWarning;

/// Attendance statistics for one employee over a period.
///
/// Derived on demand and never stored. Percentages and averages are
/// rounded to two decimal places.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeSummary {
    /// The employee.
    pub employee_id: String,
    /// Distinct scheduled dates (rest and unresolved days excluded).
    pub total_days: u32,
    /// Days classified on time or tardy.
    pub present_days: u32,
    /// Days with no punch at all.
    pub absent_days: u32,
    /// Vacation days.
    pub vacation_days: u32,
    /// Permission days.
    pub permission_days: u32,
    /// Days classified tardy.
    pub tardy_days: u32,
    /// Days with punches but no valid entry mark.
    pub incomplete_days: u32,
    /// Sum of minutes late.
    pub total_tardiness_minutes: i64,
    /// Mean minutes late over days with any lateness; zero if none.
    pub average_tardiness: Decimal,
    /// `present_days / total_days * 100`; zero when `total_days` is zero.
    pub attendance_percentage: Decimal,
    /// Ambiguities found while summarising.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ResolutionWarning>,
}

impl EmployeeSummary {
    /// An all-zero summary.
    pub fn empty(employee_id: impl Into<String>) -> Self {
        Self {
            employee_id: employee_id.into(),
            total_days: 0,
            present_days: 0,
            absent_days: 0,
            vacation_days: 0,
            permission_days: 0,
            tardy_days: 0,
            incomplete_days: 0,
            total_tardiness_minutes: 0,
            average_tardiness: Decimal::ZERO,
            attendance_percentage: Decimal::ZERO,
            warnings: Vec::new(),
        }
    }
}
