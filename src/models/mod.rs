//! Core data models for the attendance engine.
//!
//! This module contains all the domain records used throughout the engine.
//! They are plain data: behaviour beyond validation and small accessors
//! lives in [`crate::calculation`].

mod attendance_row;
mod classified;
mod date_range;
mod exception;
mod punch;
mod resolved_day;
mod shift;
mod summary;
mod time_interval;
mod warning;

pub use attendance_row::{AttendanceRow, classified_from_rows, parse_rows, punches_from_rows};
pub use classified::{ClassifiedPunch, OvertimeSplit, PunctualityState};
pub use date_range::DateRange;
pub use exception::{ExceptionPriority, ExceptionRule, ScheduleException, weekday_index};
pub use punch::{LeaveFact, LeaveKind, ManualAdjustment, Punch, PunchType};
pub use resolved_day::{AppliedException, DayStatus, ExpectedTimes, PunchWindows, ResolvedDay};
pub use shift::{Assignment, CycleDay, CycleUnit, ShiftDefinition};
pub use summary::EmployeeSummary;
pub use time_interval::{
    BreakWindow, MAX_OVERTIME_LEVELS, OvertimeLevel, PunchMargins, TimeInterval,
    parse_time_of_day,
};
pub use warning::{ResolutionWarning, WarningCode};
