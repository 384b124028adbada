//! Classified attendance records.
//!
//! This module contains [`ClassifiedPunch`], the per-day outcome of comparing
//! punches against a resolved schedule, and the [`PunctualityState`] it
//! carries.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::PunchType;

/// Punctuality outcome of one scheduled day.
///
/// Serialized with the labels used by the attendance reports.
///
/// # Example
///
/// ```
/// use attendance_engine::models::PunctualityState;
///
/// let state: PunctualityState = "TARDANZA".parse().unwrap();
/// assert_eq!(state, PunctualityState::Tardy);
/// assert!(state.is_present());
/// assert_eq!(PunctualityState::Absent.to_string(), "FALTA");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PunctualityState {
    /// Entry within the lateness allowance.
    #[serde(rename = "PUNTUAL")]
    OnTime,
    /// Entry later than the lateness allowance.
    #[serde(rename = "TARDANZA")]
    Tardy,
    /// Scheduled, but no punch anywhere in the day's span.
    #[serde(rename = "FALTA")]
    Absent,
    /// Rest day.
    #[serde(rename = "DESCANSO")]
    Rest,
    /// On vacation.
    #[serde(rename = "VACACIONES")]
    Vacation,
    /// On an approved permit.
    #[serde(rename = "PERMISO")]
    Permission,
    /// Punches in the span, but none in the entry window.
    #[serde(rename = "INCOMPLETO")]
    Incomplete,
    /// The schedule for the date could not be resolved.
    #[serde(rename = "SIN_HORARIO")]
    Unresolved,
}

impl PunctualityState {
    /// The report label for the state.
    pub fn label(self) -> &'static str {
        match self {
            PunctualityState::OnTime => "PUNTUAL",
            PunctualityState::Tardy => "TARDANZA",
            PunctualityState::Absent => "FALTA",
            PunctualityState::Rest => "DESCANSO",
            PunctualityState::Vacation => "VACACIONES",
            PunctualityState::Permission => "PERMISO",
            PunctualityState::Incomplete => "INCOMPLETO",
            PunctualityState::Unresolved => "SIN_HORARIO",
        }
    }

    /// Returns true for states that count as a day present.
    pub fn is_present(self) -> bool {
        matches!(self, PunctualityState::OnTime | PunctualityState::Tardy)
    }

    /// Returns true for states that count towards the scheduled total.
    pub fn is_scheduled(self) -> bool {
        !matches!(self, PunctualityState::Rest | PunctualityState::Unresolved)
    }
}

impl fmt::Display for PunctualityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PunctualityState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PUNTUAL" => Ok(PunctualityState::OnTime),
            "TARDANZA" => Ok(PunctualityState::Tardy),
            "FALTA" | "AUSENTE" => Ok(PunctualityState::Absent),
            "DESCANSO" => Ok(PunctualityState::Rest),
            "VACACIONES" => Ok(PunctualityState::Vacation),
            "PERMISO" => Ok(PunctualityState::Permission),
            "INCOMPLETO" => Ok(PunctualityState::Incomplete),
            "SIN_HORARIO" => Ok(PunctualityState::Unresolved),
            other => Err(format!("unknown punctuality state '{}'", other)),
        }
    }
}

/// Overtime minutes falling into one tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeSplit {
    /// Tier number, 1 to 3.
    pub level: u8,
    /// Minutes paid at this tier.
    pub minutes: i64,
    /// Pay multiplier percentage of the tier.
    pub percentage: Decimal,
}

/// The classified outcome for one employee on one date.
///
/// Optional numeric fields are `None` when the value does not apply (rest
/// days, absences, leave) and `Some(0)` when it was computed as zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedPunch {
    /// The employee.
    pub employee_id: String,
    /// The calendar date the schedule belongs to.
    pub date: NaiveDate,
    /// The shift (or shift name, for store rows).
    #[serde(default)]
    pub shift_id: Option<String>,
    /// The interval in effect.
    #[serde(default)]
    pub interval_id: Option<String>,
    /// True if the interval came from an exception.
    #[serde(default)]
    pub is_exception: bool,
    /// Entry/exit type of the store row; `None` for a whole-day record.
    #[serde(default)]
    pub row_type: Option<PunchType>,
    /// Outcome of the classification.
    pub state: PunctualityState,
    /// Expected entry timestamp.
    #[serde(default)]
    pub expected_entry: Option<NaiveDateTime>,
    /// Expected exit timestamp.
    #[serde(default)]
    pub expected_exit: Option<NaiveDateTime>,
    /// Every punch attributed to the day, after manual corrections.
    #[serde(default)]
    pub punches: Vec<NaiveDateTime>,
    /// The punch used as the entry mark.
    #[serde(default)]
    pub entry_punch: Option<NaiveDateTime>,
    /// The punch used as the exit mark.
    #[serde(default)]
    pub exit_punch: Option<NaiveDateTime>,
    /// Whole minutes after the expected entry (truncated).
    #[serde(default)]
    pub minutes_late: Option<i64>,
    /// Whole minutes before the expected exit (truncated).
    #[serde(default)]
    pub minutes_early: Option<i64>,
    /// Whole minutes the entry punch preceded the expected entry.
    #[serde(default)]
    pub early_arrival_minutes: Option<i64>,
    /// True if the early departure exceeds the interval's allowance.
    #[serde(default)]
    pub left_early: bool,
    /// Minutes worked between entry and exit, less unpaid breaks.
    #[serde(default)]
    pub worked_minutes: Option<i64>,
    /// Extra minutes split by overtime tier.
    #[serde(default)]
    pub overtime: Vec<OvertimeSplit>,
    /// Manual adjustment reason, verbatim.
    #[serde(default)]
    pub remark: Option<String>,
    /// Permit-type label when the day is covered by leave.
    #[serde(default)]
    pub leave_label: Option<String>,
}

impl ClassifiedPunch {
    /// Creates a record with the given state and no measurements.
    pub fn bare(employee_id: impl Into<String>, date: NaiveDate, state: PunctualityState) -> Self {
        Self {
            employee_id: employee_id.into(),
            date,
            shift_id: None,
            interval_id: None,
            is_exception: false,
            row_type: None,
            state,
            expected_entry: None,
            expected_exit: None,
            punches: Vec::new(),
            entry_punch: None,
            exit_punch: None,
            minutes_late: None,
            minutes_early: None,
            early_arrival_minutes: None,
            left_early: false,
            worked_minutes: None,
            overtime: Vec::new(),
            remark: None,
            leave_label: None,
        }
    }

    /// Total overtime minutes across tiers.
    pub fn overtime_minutes(&self) -> i64 {
        self.overtime.iter().map(|o| o.minutes).sum()
    }
}
