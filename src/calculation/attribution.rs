//! Punch attribution.
//!
//! Raw punches carry only a timestamp; they do not say which scheduled day
//! they belong to. A 05:50 punch may be the exit of the shift that started
//! at 22:00 the previous evening, or the entry of a shift that starts at
//! 06:00 the same day. This module assigns each punch to at most one
//! resolved day by comparing it against the absolute punch windows.

use chrono::NaiveDateTime;
use tracing::debug;

use crate::models::{Punch, PunchType, ResolvedDay};

/// Distributes `punches` over `days`.
///
/// Returns one vector per day, in the same order as `days`. A punch is
/// attributed to the day whose expected entry or exit (matching the punch
/// type, when known) is nearest among the days whose punch window contains
/// it. Punches that fall inside a day's overall span but outside both of
/// its windows go to the earliest such day. Punches outside every span are
/// dropped.
///
/// # Example
///
/// ```
/// use attendance_engine::calculation::{ScheduleResolver, attribute_punches};
/// use attendance_engine::config::ConfigLoader;
/// use attendance_engine::models::{Assignment, DateRange, Punch};
/// use chrono::NaiveDate;
///
/// let config = ConfigLoader::load("./config/default").unwrap();
/// let resolver = ScheduleResolver::new(config.catalog(), &[]);
/// let assignment = Assignment {
///     id: "asg_1".to_string(),
///     employee_id: "emp_001".to_string(),
///     shift_id: "rotation".to_string(),
///     start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///     end_date: None,
/// };
/// let range = DateRange::new(
///     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
/// ).unwrap();
/// let days = resolver.resolve(&assignment, range).unwrap().days;
///
/// // 05:50 on the 2nd closes the night shift that began on the 1st.
/// let exit = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(5, 50, 0).unwrap();
/// let attributed = attribute_punches(&days, &[Punch::at("emp_001", exit)]);
/// assert_eq!(attributed[0].len(), 1);
/// assert!(attributed[1].is_empty());
/// ```
pub fn attribute_punches(days: &[ResolvedDay], punches: &[Punch]) -> Vec<Vec<Punch>> {
    let mut attributed: Vec<Vec<Punch>> = vec![Vec::new(); days.len()];

    for punch in punches {
        let at = punch.effective_timestamp();
        match best_day(days, punch, at) {
            Some(index) => attributed[index].push(punch.clone()),
            None => debug!(
                employee_id = %punch.employee_id,
                timestamp = %at,
                "Punch outside every scheduled window"
            ),
        }
    }

    for bucket in &mut attributed {
        bucket.sort_by_key(Punch::effective_timestamp);
    }
    attributed
}

fn best_day(days: &[ResolvedDay], punch: &Punch, at: NaiveDateTime) -> Option<usize> {
    let mut nearest: Option<(usize, i64)> = None;
    let mut first_span: Option<usize> = None;

    for (index, day) in days.iter().enumerate() {
        if day.employee_id != punch.employee_id {
            continue;
        }
        let Some(expected) = day.expected.as_ref() else {
            continue;
        };
        if !expected.windows.in_span(at) {
            continue;
        }
        first_span.get_or_insert(index);

        let mut distance: Option<i64> = None;
        if punch.punch_type != Some(PunchType::Exit) && expected.windows.in_entry(at) {
            distance = Some((at - expected.entry).num_seconds().abs());
        }
        if punch.punch_type != Some(PunchType::Entry) && expected.windows.in_exit(at) {
            let d = (at - expected.exit).num_seconds().abs();
            distance = Some(distance.map_or(d, |e| e.min(d)));
        }

        if let Some(d) = distance {
            if nearest.is_none_or(|(_, best)| d < best) {
                nearest = Some((index, d));
            }
        }
    }

    nearest.map(|(index, _)| index).or(first_span)
}
