//! Per-employee attendance aggregation.
//!
//! Folds classified days into an [`EmployeeSummary`]. Each calendar date
//! counts once: when entry and exit rows both exist for a date, the entry
//! row is the canonical one. Rest and unresolved days are not part of the
//! total.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::warn;

use crate::models::{
    ClassifiedPunch, EmployeeSummary, PunchType, PunctualityState, ResolutionWarning,
    WarningCode,
};

/// Summarizes `records` for `employee_id`.
///
/// Records belonging to other employees are ignored. Averages and
/// percentages are rounded to two decimal places, half away from zero,
/// and are zero rather than undefined when there is nothing to divide by.
///
/// # Example
///
/// ```
/// use attendance_engine::calculation::summarize;
/// use rust_decimal::Decimal;
///
/// let summary = summarize("emp_001", &[]);
/// assert_eq!(summary.total_days, 0);
/// assert_eq!(summary.attendance_percentage, Decimal::ZERO);
/// assert_eq!(summary.average_tardiness, Decimal::ZERO);
/// ```
pub fn summarize(employee_id: &str, records: &[ClassifiedPunch]) -> EmployeeSummary {
    let mut summary = EmployeeSummary::empty(employee_id);

    let mut by_date: BTreeMap<NaiveDate, Vec<&ClassifiedPunch>> = BTreeMap::new();
    for record in records.iter().filter(|r| r.employee_id == employee_id) {
        by_date.entry(record.date).or_default().push(record);
    }

    let mut late_minutes_total = 0_i64;
    let mut late_records = 0_i64;

    for (date, day_records) in &by_date {
        let entries: Vec<&ClassifiedPunch> = day_records
            .iter()
            .copied()
            .filter(|r| r.row_type != Some(PunchType::Exit))
            .collect();

        if entries.len() > 1 {
            summary
                .warnings
                .push(multiple_entries_warning(employee_id, *date, entries.len()));
        }

        let Some(canonical) = entries.first().or_else(|| day_records.first()) else {
            continue;
        };

        if let Some(late) = canonical.minutes_late.filter(|m| *m > 0) {
            late_minutes_total += late;
            late_records += 1;
        }

        if !canonical.state.is_scheduled() {
            continue;
        }
        summary.total_days += 1;

        match canonical.state {
            PunctualityState::OnTime => summary.present_days += 1,
            PunctualityState::Tardy => {
                summary.present_days += 1;
                summary.tardy_days += 1;
            }
            PunctualityState::Absent => summary.absent_days += 1,
            PunctualityState::Vacation => summary.vacation_days += 1,
            PunctualityState::Permission => summary.permission_days += 1,
            PunctualityState::Incomplete => summary.incomplete_days += 1,
            PunctualityState::Rest | PunctualityState::Unresolved => {}
        }
    }

    summary.total_tardiness_minutes = late_minutes_total;
    summary.average_tardiness = ratio(Decimal::from(late_minutes_total), late_records);
    summary.attendance_percentage = ratio(
        Decimal::from(summary.present_days) * Decimal::ONE_HUNDRED,
        i64::from(summary.total_days),
    );

    summary
}

/// `numerator / denominator` rounded to two places; zero when the
/// denominator is zero.
fn ratio(numerator: Decimal, denominator: i64) -> Decimal {
    if denominator == 0 {
        return Decimal::ZERO;
    }
    (numerator / Decimal::from(denominator))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn multiple_entries_warning(employee_id: &str, date: NaiveDate, count: usize) -> ResolutionWarning {
    warn!(
        employee_id = %employee_id,
        date = %date,
        entries = count,
        "Multiple entry records for one day; counting the first"
    );

    ResolutionWarning {
        code: WarningCode::MultipleEntryRecords,
        employee_id: employee_id.to_string(),
        date,
        message: format!("{} entry records on {}; the day is counted once", count, date),
        related_ids: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn make_date(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn record(date: &str, state: PunctualityState, minutes_late: Option<i64>) -> ClassifiedPunch {
        let mut record = ClassifiedPunch::bare("emp_001", make_date(date), state);
        record.minutes_late = minutes_late;
        record
    }

    #[test]
    fn test_empty_input_is_all_zero() {
        let summary = summarize("emp_001", &[]);
        assert_eq!(summary, EmployeeSummary::empty("emp_001"));
    }

    #[test]
    fn test_counts_by_state() {
        let records = vec![
            record("2024-01-01", PunctualityState::OnTime, Some(0)),
            record("2024-01-02", PunctualityState::Tardy, Some(20)),
            record("2024-01-03", PunctualityState::Absent, None),
            record("2024-01-04", PunctualityState::Vacation, None),
            record("2024-01-05", PunctualityState::Permission, None),
            record("2024-01-06", PunctualityState::Rest, None),
            record("2024-01-07", PunctualityState::Unresolved, None),
            record("2024-01-08", PunctualityState::Incomplete, None),
        ];

        let summary = summarize("emp_001", &records);
        assert_eq!(summary.total_days, 6);
        assert_eq!(summary.present_days, 2);
        assert_eq!(summary.tardy_days, 1);
        assert_eq!(summary.absent_days, 1);
        assert_eq!(summary.vacation_days, 1);
        assert_eq!(summary.permission_days, 1);
        assert_eq!(summary.incomplete_days, 1);
        assert_eq!(summary.total_tardiness_minutes, 20);
        assert_eq!(summary.average_tardiness, dec("20.00"));
        // 2 / 6 = 33.333...
        assert_eq!(summary.attendance_percentage, dec("33.33"));
    }

    #[test]
    fn test_average_counts_only_positive_lateness() {
        let records = vec![
            record("2024-01-01", PunctualityState::OnTime, Some(5)),
            record("2024-01-02", PunctualityState::Tardy, Some(20)),
            record("2024-01-03", PunctualityState::OnTime, Some(0)),
        ];

        let summary = summarize("emp_001", &records);
        assert_eq!(summary.total_tardiness_minutes, 25);
        assert_eq!(summary.average_tardiness, dec("12.50"));
        assert_eq!(summary.attendance_percentage, dec("100"));
    }

    #[test]
    fn test_average_rounds_half_away_from_zero() {
        let records = vec![
            record("2024-01-01", PunctualityState::Tardy, Some(11)),
            record("2024-01-02", PunctualityState::Tardy, Some(12)),
            record("2024-01-03", PunctualityState::Tardy, Some(12)),
            record("2024-01-04", PunctualityState::Tardy, Some(12)),
            record("2024-01-05", PunctualityState::Tardy, Some(12)),
            record("2024-01-06", PunctualityState::Tardy, Some(12)),
            record("2024-01-07", PunctualityState::Tardy, Some(12)),
            record("2024-01-08", PunctualityState::Tardy, Some(12)),
        ];
        // 95 / 8 = 11.875
        let summary = summarize("emp_001", &records);
        assert_eq!(summary.average_tardiness, dec("11.88"));
    }

    #[test]
    fn test_entry_row_is_canonical_for_the_day() {
        let mut entry = record("2024-01-08", PunctualityState::Tardy, Some(20));
        entry.row_type = Some(PunchType::Entry);
        let mut exit = record("2024-01-08", PunctualityState::OnTime, None);
        exit.row_type = Some(PunchType::Exit);
        exit.minutes_early = Some(10);

        let summary = summarize("emp_001", &[exit, entry]);
        assert_eq!(summary.total_days, 1);
        assert_eq!(summary.tardy_days, 1);
        assert_eq!(summary.present_days, 1);
        assert!(summary.warnings.is_empty());
    }

    #[test]
    fn test_exit_only_day_still_counts_once() {
        let mut exit = record("2024-01-08", PunctualityState::Incomplete, None);
        exit.row_type = Some(PunchType::Exit);

        let summary = summarize("emp_001", &[exit]);
        assert_eq!(summary.total_days, 1);
        assert_eq!(summary.incomplete_days, 1);
    }

    #[test]
    fn test_multiple_entry_records_are_flagged() {
        let mut first = record("2024-01-08", PunctualityState::OnTime, Some(0));
        first.row_type = Some(PunchType::Entry);
        let mut second = record("2024-01-08", PunctualityState::Tardy, Some(40));
        second.row_type = Some(PunchType::Entry);

        let summary = summarize("emp_001", &[first, second]);
        assert_eq!(summary.total_days, 1);
        assert_eq!(summary.present_days, 1);
        assert_eq!(summary.tardy_days, 0);
        assert_eq!(summary.warnings.len(), 1);
        assert_eq!(summary.warnings[0].code, WarningCode::MultipleEntryRecords);
    }

    #[test]
    fn test_other_employees_are_ignored() {
        let mut other = record("2024-01-08", PunctualityState::Absent, None);
        other.employee_id = "emp_002".to_string();

        let summary = summarize("emp_001", &[other]);
        assert_eq!(summary.total_days, 0);
    }
}
