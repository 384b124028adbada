//! Schedule resolution.
//!
//! Produces, for every date of a range covered by an assignment, the
//! concrete schedule in effect. Exceptions are consulted first; otherwise
//! the cycle position decides the interval, subject to the shift's weekend
//! and day-off rules. Absolute timestamps are always built as offsets from
//! the entry timestamp, which is what keeps overnight shifts on the date
//! they started.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use tracing::debug;

use crate::config::ScheduleCatalog;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AppliedException, Assignment, DateRange, DayStatus, ExpectedTimes, PunchWindows,
    ResolutionWarning, ResolvedDay, ScheduleException, ShiftDefinition, TimeInterval, WarningCode,
};

use super::cycle_index::index_for;
use super::exception_resolver::ExceptionResolver;

/// Resolved days for a range together with the non-fatal warnings raised
/// while producing them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// One entry per covered date, in date order.
    pub days: Vec<ResolvedDay>,
    /// Ambiguities and data gaps encountered.
    pub warnings: Vec<ResolutionWarning>,
}

/// Resolves assignments against a catalog and a set of exceptions.
///
/// Both inputs are borrowed for the lifetime of the resolver and never
/// modified, so one resolver can be shared by any number of threads.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleResolver<'a> {
    catalog: &'a ScheduleCatalog,
    exceptions: ExceptionResolver<'a>,
}

impl<'a> ScheduleResolver<'a> {
    /// Creates a resolver. Exceptions are validated per employee when
    /// that employee is resolved.
    pub fn new(catalog: &'a ScheduleCatalog, exceptions: &'a [ScheduleException]) -> Self {
        Self {
            catalog,
            exceptions: ExceptionResolver::new(exceptions),
        }
    }

    /// Resolves one assignment over `range`.
    ///
    /// Dates outside the assignment are skipped, so the result may be
    /// shorter than the range.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the assignment is invalid, its
    /// shift is unknown, one of the employee's exceptions is malformed, or
    /// an applied exception references an unknown interval.
    ///
    /// # Example
    ///
    /// ```
    /// use attendance_engine::calculation::ScheduleResolver;
    /// use attendance_engine::config::ConfigLoader;
    /// use attendance_engine::models::{Assignment, DateRange};
    /// use chrono::NaiveDate;
    ///
    /// let config = ConfigLoader::load("./config/default").unwrap();
    /// let resolver = ScheduleResolver::new(config.catalog(), &[]);
    ///
    /// let assignment = Assignment {
    ///     id: "asg_1".to_string(),
    ///     employee_id: "emp_001".to_string(),
    ///     shift_id: "office".to_string(),
    ///     start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
    ///     end_date: None,
    /// };
    /// let range = DateRange::new(
    ///     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
    ///     NaiveDate::from_ymd_opt(2024, 1, 7).unwrap(),
    /// ).unwrap();
    ///
    /// let resolution = resolver.resolve(&assignment, range).unwrap();
    /// assert_eq!(resolution.days.len(), 7);
    /// assert!(resolution.days[5].is_rest());
    /// ```
    pub fn resolve(&self, assignment: &Assignment, range: DateRange) -> EngineResult<Resolution> {
        assignment.validate()?;
        self.exceptions.validate_for(&assignment.employee_id)?;
        let shift = self
            .catalog
            .shift(&assignment.shift_id)
            .ok_or_else(|| EngineError::UnknownShift {
                shift_id: assignment.shift_id.clone(),
                assignment_id: assignment.id.clone(),
            })?;
        shift.validate()?;

        let mut resolution = Resolution::default();
        for date in range.days().filter(|d| assignment.covers(*d)) {
            self.resolve_date(assignment, shift, date, &mut resolution)?;
        }

        debug!(
            employee_id = %assignment.employee_id,
            assignment_id = %assignment.id,
            shift_id = %shift.id,
            days = resolution.days.len(),
            warnings = resolution.warnings.len(),
            "Resolved assignment"
        );

        Ok(resolution)
    }

    /// Resolves every assignment belonging to `employee_id` and merges the
    /// results in date order.
    ///
    /// Assignments for other employees are ignored.
    ///
    /// # Errors
    ///
    /// [`EngineError::OverlappingAssignments`] when two assignments cover a
    /// common date inside `range`, plus anything [`resolve`](Self::resolve)
    /// can return.
    pub fn resolve_employee(
        &self,
        employee_id: &str,
        assignments: &[Assignment],
        range: DateRange,
    ) -> EngineResult<Resolution> {
        let mut own: Vec<&Assignment> = assignments
            .iter()
            .filter(|a| a.employee_id == employee_id)
            .collect();
        own.sort_by(|a, b| a.start_date.cmp(&b.start_date).then_with(|| a.id.cmp(&b.id)));

        for assignment in &own {
            assignment.validate()?;
        }

        for (i, first) in own.iter().enumerate() {
            for second in &own[i + 1..] {
                if let Some(date) = overlap_within(first, second, range) {
                    return Err(EngineError::OverlappingAssignments {
                        employee_id: employee_id.to_string(),
                        first: first.id.clone(),
                        second: second.id.clone(),
                        date,
                    });
                }
            }
        }

        let mut merged = Resolution::default();
        for assignment in own {
            let resolution = self.resolve(assignment, range)?;
            merged.days.extend(resolution.days);
            merged.warnings.extend(resolution.warnings);
        }
        merged.days.sort_by_key(|d| d.date);
        merged.warnings.sort_by_key(|w| w.date);

        Ok(merged)
    }

    fn resolve_date(
        &self,
        assignment: &Assignment,
        shift: &ShiftDefinition,
        date: NaiveDate,
        resolution: &mut Resolution,
    ) -> EngineResult<()> {
        let day_index = index_for(assignment.start_date, shift.cycle_days(), date)?;

        let found = self
            .exceptions
            .find_override(&assignment.employee_id, &assignment.id, date);
        if let Some(warning) = found.warning {
            resolution.warnings.push(warning);
        }

        let mut day = ResolvedDay {
            employee_id: assignment.employee_id.clone(),
            assignment_id: assignment.id.clone(),
            shift_id: shift.id.clone(),
            date,
            day_index,
            status: DayStatus::Scheduled,
            interval: None,
            is_exception: false,
            exception: None,
            expected: None,
        };

        if let Some(exception) = found.matched {
            let interval = self.catalog.interval(&exception.interval_id).ok_or_else(|| {
                EngineError::UnknownTimeInterval {
                    interval_id: exception.interval_id.clone(),
                    referenced_by: format!("exception '{}'", exception.id),
                }
            })?;
            day.is_exception = true;
            day.exception = Some(AppliedException {
                exception_id: exception.id.clone(),
                priority: exception.priority(),
            });
            day.expected = Some(expected_times(date, interval));
            day.interval = Some(interval.clone());
            resolution.days.push(day);
            return Ok(());
        }

        let cycle_day = shift.day(day_index);
        let rest_weekend = is_weekend(date) && !shift.works_weekends;
        let rest_day_off = cycle_day.is_some_and(|d| d.day_off) && !shift.works_days_off;

        if rest_weekend || rest_day_off {
            day.status = DayStatus::Rest;
        } else if let Some(interval_id) = shift.interval_at(day_index) {
            let interval = self.catalog.interval(interval_id).ok_or_else(|| {
                EngineError::UnknownTimeInterval {
                    interval_id: interval_id.to_string(),
                    referenced_by: format!("shift '{}'", shift.id),
                }
            })?;
            day.expected = Some(expected_times(date, interval));
            day.interval = Some(interval.clone());
        } else {
            debug!(
                employee_id = %assignment.employee_id,
                shift_id = %shift.id,
                date = %date,
                day_index,
                "No interval bound to cycle position"
            );
            day.status = DayStatus::Unresolved;
            resolution.warnings.push(ResolutionWarning {
                code: WarningCode::UnresolvedDay,
                employee_id: assignment.employee_id.clone(),
                date,
                message: format!(
                    "shift '{}' has no interval at cycle position {}",
                    shift.id, day_index
                ),
                related_ids: vec![assignment.id.clone(), shift.id.clone()],
            });
        }

        resolution.days.push(day);
        Ok(())
    }
}

/// Builds the absolute expected timestamps and punch windows of `interval`
/// worked on `date`.
///
/// The exit is `entry + duration`, so an interval starting at 22:00 for
/// eight hours exits at 06:00 on the following calendar day.
///
/// # Example
///
/// ```
/// use attendance_engine::calculation::expected_times;
/// use attendance_engine::models::{PunchMargins, TimeInterval};
/// use chrono::{NaiveDate, NaiveTime};
///
/// let night = TimeInterval {
///     id: "night".to_string(),
///     name: "Night".to_string(),
///     entry_time: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
///     duration_minutes: 480,
///     breaks: vec![],
///     margins: PunchMargins { entry_from: 60, entry_to: 120, exit_from: 60, exit_to: 180 },
///     overtime_levels: vec![],
///     allow_late_minutes: 10,
///     allow_early_leave_minutes: 0,
/// };
///
/// let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let expected = expected_times(date, &night);
/// assert_eq!(expected.exit, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(6, 0, 0).unwrap());
/// assert_eq!(expected.windows.exit_to, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(9, 0, 0).unwrap());
/// ```
pub fn expected_times(date: NaiveDate, interval: &TimeInterval) -> ExpectedTimes {
    let entry = date.and_time(interval.entry_time);
    let exit = entry + Duration::minutes(i64::from(interval.duration_minutes));
    let margins = interval.margins;

    ExpectedTimes {
        entry,
        exit,
        windows: PunchWindows {
            entry_from: entry - Duration::minutes(i64::from(margins.entry_from)),
            entry_to: entry + Duration::minutes(i64::from(margins.entry_to)),
            exit_from: exit - Duration::minutes(i64::from(margins.exit_from)),
            exit_to: exit + Duration::minutes(i64::from(margins.exit_to)),
        },
    }
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// First date inside `range` covered by both assignments.
fn overlap_within(a: &Assignment, b: &Assignment, range: DateRange) -> Option<NaiveDate> {
    let start = a.first_overlap(b)?;
    let end = match (a.end_date, b.end_date) {
        (Some(x), Some(y)) => x.min(y),
        (Some(x), None) | (None, Some(x)) => x,
        (None, None) => range.end_date,
    };
    let from = start.max(range.start_date);
    (from <= end.min(range.end_date)).then_some(from)
}
