//! Punch classification against a resolved day.
//!
//! Each day is evaluated wholesale; there is no incremental state. The
//! outcome is decided in this order:
//!
//! 1. rest day: `DESCANSO`;
//! 2. no interval could be resolved: `SIN_HORARIO`;
//! 3. a leave fact exists: `VACACIONES` or `PERMISO`, punches ignored;
//! 4. no punch inside the day's span: `FALTA`;
//! 5. punches in the span but none in the entry window: `INCOMPLETO`;
//! 6. otherwise `TARDANZA` if lateness exceeds the allowance, else `PUNTUAL`.
//!
//! Early departure is recorded alongside but never changes the state.

use chrono::NaiveDateTime;

use crate::models::{
    ClassifiedPunch, LeaveFact, LeaveKind, Punch, PunctualityState, ResolvedDay,
};

use super::attribution::attribute_punches;
use super::overtime::split_overtime;

/// Classifies one resolved day.
///
/// `punches` should already be the punches attributed to this day; any
/// outside the day's span are ignored. Approved manual adjustments replace
/// the raw timestamp and their reason is carried into `remark`.
///
/// # Example
///
/// ```
/// use attendance_engine::calculation::{ScheduleResolver, classify_day};
/// use attendance_engine::config::ConfigLoader;
/// use attendance_engine::models::{Assignment, DateRange, Punch, PunctualityState};
/// use chrono::NaiveDate;
///
/// let config = ConfigLoader::load("./config/default").unwrap();
/// let resolver = ScheduleResolver::new(config.catalog(), &[]);
/// let assignment = Assignment {
///     id: "asg_1".to_string(),
///     employee_id: "emp_001".to_string(),
///     shift_id: "office".to_string(),
///     start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///     end_date: None,
/// };
/// let date = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
/// let day = resolver.resolve(&assignment, DateRange::single(date)).unwrap().days.remove(0);
///
/// // The morning interval allows 15 minutes.
/// let punch = Punch::at("emp_001", date.and_hms_opt(8, 20, 0).unwrap());
/// let record = classify_day(&day, &[punch], None);
/// assert_eq!(record.state, PunctualityState::Tardy);
/// assert_eq!(record.minutes_late, Some(20));
/// ```
pub fn classify_day(
    day: &ResolvedDay,
    punches: &[Punch],
    leave: Option<&LeaveFact>,
) -> ClassifiedPunch {
    let mut record = ClassifiedPunch::bare(day.employee_id.clone(), day.date, PunctualityState::Rest);
    record.shift_id = Some(day.shift_id.clone());
    record.interval_id = day.interval.as_ref().map(|i| i.id.clone());
    record.is_exception = day.is_exception;

    if day.is_rest() {
        return record;
    }

    let (Some(interval), Some(expected)) = (day.interval.as_ref(), day.expected.as_ref()) else {
        record.state = PunctualityState::Unresolved;
        return record;
    };
    record.expected_entry = Some(expected.entry);
    record.expected_exit = Some(expected.exit);

    if let Some(leave) = leave {
        record.state = match leave.kind {
            LeaveKind::Vacation => PunctualityState::Vacation,
            LeaveKind::Permission => PunctualityState::Permission,
        };
        record.leave_label = leave.label.clone();
        return record;
    }

    let windows = &expected.windows;
    let mut in_span: Vec<(NaiveDateTime, &Punch)> = punches
        .iter()
        .map(|p| (p.effective_timestamp(), p))
        .filter(|(at, _)| windows.in_span(*at))
        .collect();
    in_span.sort_by_key(|(at, _)| *at);
    record.punches = in_span.iter().map(|(at, _)| *at).collect();

    if in_span.is_empty() {
        record.state = PunctualityState::Absent;
        return record;
    }

    let entry = in_span
        .iter()
        .position(|(at, p)| p.can_be_entry() && windows.in_entry(*at));
    let exit = in_span
        .iter()
        .enumerate()
        .rev()
        .find(|(i, (at, p))| Some(*i) != entry && p.can_be_exit() && windows.in_exit(*at))
        .map(|(i, _)| i)
        .filter(|i| entry.is_none_or(|e| *i > e));

    if let Some(i) = exit {
        let (at, _) = in_span[i];
        let early = non_negative_minutes(expected.exit, at);
        record.exit_punch = Some(at);
        record.minutes_early = Some(early);
        record.left_early = early > i64::from(interval.allow_early_leave_minutes);
    }

    record.remark = entry
        .into_iter()
        .chain(exit)
        .chain(0..in_span.len())
        .find_map(|i| in_span[i].1.remark())
        .map(str::to_string);

    let Some(e) = entry else {
        record.state = PunctualityState::Incomplete;
        return record;
    };

    let (entry_at, _) = in_span[e];
    let late = non_negative_minutes(entry_at, expected.entry);
    record.entry_punch = Some(entry_at);
    record.minutes_late = Some(late);
    record.early_arrival_minutes = Some(non_negative_minutes(expected.entry, entry_at));
    record.state = if late > i64::from(interval.allow_late_minutes) {
        PunctualityState::Tardy
    } else {
        PunctualityState::OnTime
    };

    if let Some(exit_at) = record.exit_punch {
        let worked = ((exit_at - entry_at).num_minutes() - interval.unpaid_break_minutes()).max(0);
        record.worked_minutes = Some(worked);
        record.overtime = split_overtime(
            worked - interval.expected_worked_minutes(),
            &interval.overtime_levels,
        );
    }

    record
}

/// Attributes `punches` to `days` and classifies each day, looking up the
/// leave fact for the day's employee and date in `leaves`.
pub fn classify_days(
    days: &[ResolvedDay],
    punches: &[Punch],
    leaves: &[LeaveFact],
) -> Vec<ClassifiedPunch> {
    let attributed = attribute_punches(days, punches);

    days.iter()
        .zip(attributed)
        .map(|(day, day_punches)| {
            let leave = leaves
                .iter()
                .find(|l| l.employee_id == day.employee_id && l.date == day.date);
            classify_day(day, &day_punches, leave)
        })
        .collect()
}

/// Whole minutes from `from` to `to`, truncated, floored at zero.
fn non_negative_minutes(to: NaiveDateTime, from: NaiveDateTime) -> i64 {
    (to - from).num_minutes().max(0)
}
