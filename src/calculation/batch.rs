//! Multi-employee batch processing.
//!
//! A batch resolves, classifies and summarizes many employees against one
//! immutable snapshot of the catalog and exceptions. Each employee is an
//! independent CPU-bound job run on tokio's blocking pool, with at most
//! `workers` jobs in flight. One employee failing never aborts the others;
//! failures are reported alongside the successful reports.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::ScheduleCatalog;
use crate::error::{EngineResult, FailureReport};
use crate::models::{
    Assignment, ClassifiedPunch, DateRange, EmployeeSummary, LeaveFact, Punch,
    ResolutionWarning, ScheduleException,
};

use super::aggregation::summarize;
use super::schedule_resolver::ScheduleResolver;
use super::tolerance::classify_days;

/// Read-only inputs shared by every employee of a batch.
#[derive(Debug, Clone)]
pub struct BatchSnapshot {
    /// Validated intervals and shifts.
    pub catalog: ScheduleCatalog,
    /// All schedule exceptions in effect.
    pub exceptions: Vec<ScheduleException>,
    /// The period being reported on.
    pub period: DateRange,
}

/// Everything the collaborator store supplied for one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeInput {
    /// Employee identifier.
    pub employee_id: String,
    /// The employee's shift assignments.
    pub assignments: Vec<Assignment>,
    /// Raw punches for the period.
    #[serde(default)]
    pub punches: Vec<Punch>,
    /// Leave and vacation facts for the period.
    #[serde(default)]
    pub leaves: Vec<LeaveFact>,
}

/// Detail and summary for one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeReport {
    /// Employee identifier.
    pub employee_id: String,
    /// One classified record per resolved date.
    pub days: Vec<ClassifiedPunch>,
    /// Aggregated counts over the period.
    pub summary: EmployeeSummary,
    /// Resolution and aggregation warnings, in date order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ResolutionWarning>,
}

/// An employee that could not be processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeFailure {
    /// Employee identifier.
    pub employee_id: String,
    /// What went wrong.
    pub error: FailureReport,
}

/// Result of a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutcome {
    /// Correlation id carried by every log event of the run.
    pub run_id: Uuid,
    /// Successful employees, sorted by employee id.
    pub reports: Vec<EmployeeReport>,
    /// Failed employees, sorted by employee id.
    pub failures: Vec<EmployeeFailure>,
}

/// Resolves, classifies and summarizes one employee.
///
/// # Errors
///
/// Any configuration error hit while resolving the employee's schedule.
/// No partial result is returned.
pub fn process_employee(
    snapshot: &BatchSnapshot,
    input: &EmployeeInput,
) -> EngineResult<EmployeeReport> {
    let resolver = ScheduleResolver::new(&snapshot.catalog, &snapshot.exceptions);
    let resolution =
        resolver.resolve_employee(&input.employee_id, &input.assignments, snapshot.period)?;

    let days = classify_days(&resolution.days, &input.punches, &input.leaves);
    let summary = summarize(&input.employee_id, &days);

    let mut warnings = resolution.warnings;
    warnings.extend(summary.warnings.iter().cloned());
    warnings.sort_by_key(|w| w.date);

    Ok(EmployeeReport {
        employee_id: input.employee_id.clone(),
        days,
        summary,
        warnings,
    })
}

/// Processes every employee on a bounded worker pool.
///
/// At most `workers` employees are processed at once (a value of zero is
/// treated as one). Dropping the returned future abandons outstanding
/// work; no shared state is touched, so nothing is left half-written.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use attendance_engine::calculation::{BatchSnapshot, EmployeeInput, run_batch};
/// use attendance_engine::config::ConfigLoader;
/// use attendance_engine::models::{Assignment, DateRange};
/// use chrono::NaiveDate;
///
/// let config = ConfigLoader::load("./config/default").unwrap();
/// let snapshot = Arc::new(BatchSnapshot {
///     catalog: config.catalog().clone(),
///     exceptions: vec![],
///     period: DateRange::new(
///         NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///         NaiveDate::from_ymd_opt(2024, 1, 7).unwrap(),
///     ).unwrap(),
/// });
/// let employees = vec![EmployeeInput {
///     employee_id: "emp_001".to_string(),
///     assignments: vec![Assignment {
///         id: "asg_1".to_string(),
///         employee_id: "emp_001".to_string(),
///         shift_id: "office".to_string(),
///         start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///         end_date: None,
///     }],
///     punches: vec![],
///     leaves: vec![],
/// }];
///
/// let runtime = tokio::runtime::Runtime::new().unwrap();
/// let outcome = runtime.block_on(run_batch(snapshot, employees, 2));
/// assert_eq!(outcome.reports.len(), 1);
/// // Five working days without punches.
/// assert_eq!(outcome.reports[0].summary.absent_days, 5);
/// ```
pub async fn run_batch(
    snapshot: Arc<BatchSnapshot>,
    employees: Vec<EmployeeInput>,
    workers: usize,
) -> BatchOutcome {
    let run_id = Uuid::new_v4();
    let started = Instant::now();
    let workers = workers.max(1);

    info!(
        run_id = %run_id,
        employees = employees.len(),
        workers,
        period_start = %snapshot.period.start_date,
        period_end = %snapshot.period.end_date,
        "Starting attendance batch"
    );

    let semaphore = Arc::new(Semaphore::new(workers));
    let mut tasks = JoinSet::new();
    let mut pending: Vec<String> = Vec::with_capacity(employees.len());

    for input in employees {
        // Acquisition only fails on a closed semaphore.
        let permit = semaphore.clone().acquire_owned().await.ok();
        let snapshot = Arc::clone(&snapshot);
        pending.push(input.employee_id.clone());

        tasks.spawn_blocking(move || {
            let _permit = permit;
            let result = process_employee(&snapshot, &input);
            (input.employee_id, result)
        });
    }

    let mut reports = Vec::new();
    let mut failures = Vec::new();

    while let Some(joined) = tasks.join_next().await {
        let Ok((employee_id, result)) = joined else {
            continue;
        };
        if let Some(pos) = pending.iter().position(|id| *id == employee_id) {
            pending.swap_remove(pos);
        }

        match result {
            Ok(report) => reports.push(report),
            Err(error) => {
                warn!(
                    run_id = %run_id,
                    employee_id = %employee_id,
                    code = error.code(),
                    error = %error,
                    "Employee failed"
                );
                failures.push(EmployeeFailure {
                    employee_id,
                    error: FailureReport::from(&error),
                });
            }
        }
    }

    // Whatever is still pending belongs to a job that panicked.
    for employee_id in pending {
        warn!(run_id = %run_id, employee_id = %employee_id, "Employee job panicked");
        failures.push(EmployeeFailure {
            employee_id,
            error: FailureReport::new("WORKER_PANIC", "Processing aborted unexpectedly"),
        });
    }

    reports.sort_by(|a, b| a.employee_id.cmp(&b.employee_id));
    failures.sort_by(|a, b| a.employee_id.cmp(&b.employee_id));

    info!(
        run_id = %run_id,
        reports = reports.len(),
        failures = failures.len(),
        elapsed_us = started.elapsed().as_micros() as u64,
        "Finished attendance batch"
    );

    BatchOutcome {
        run_id,
        reports,
        failures,
    }
}
