//! Calculation logic for the attendance engine.
//!
//! Data flows one way through this module: [`ScheduleResolver`] turns
//! assignments into resolved days (using [`index_for`] and the
//! [`ExceptionResolver`]), [`classify_day`] compares each day against its
//! punches, and [`summarize`] folds the classified days into an
//! [`EmployeeSummary`](crate::models::EmployeeSummary). [`run_batch`] drives
//! the whole pipeline for many employees on a bounded worker pool.

mod aggregation;
mod attribution;
mod batch;
mod cycle_index;
mod exception_resolver;
mod overtime;
mod schedule_resolver;
mod tolerance;

pub use aggregation::summarize;
pub use attribution::attribute_punches;
pub use batch::{
    BatchOutcome, BatchSnapshot, EmployeeFailure, EmployeeInput, EmployeeReport,
    process_employee, run_batch,
};
pub use cycle_index::index_for;
pub use exception_resolver::{ExceptionResolver, OverrideResolution};
pub use overtime::split_overtime;
pub use schedule_resolver::{Resolution, ScheduleResolver, expected_times};
pub use tolerance::{classify_day, classify_days};
