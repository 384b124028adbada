//! Schedule exception lookup.
//!
//! Decides whether a date is overridden for an employee's assignment, and
//! by which exception. Precedence:
//!
//! 1. a date-specific exception for the exact date;
//! 2. otherwise a recurring exception for the date's weekday whose validity
//!    window contains the date;
//! 3. several matches at the same precedence are a configuration conflict:
//!    the most recently created one wins and a warning is attached;
//! 4. no match means the cyclic interval applies.

use chrono::NaiveDate;
use tracing::warn;

use crate::error::EngineResult;
use crate::models::{ExceptionPriority, ResolutionWarning, ScheduleException, WarningCode};

/// Outcome of an override lookup for one date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideResolution<'a> {
    /// The winning exception, if any matched.
    pub matched: Option<&'a ScheduleException>,
    /// Set when more than one exception matched at the winning precedence.
    pub warning: Option<ResolutionWarning>,
}

impl OverrideResolution<'_> {
    /// Priority of the winning exception.
    pub fn priority(&self) -> Option<ExceptionPriority> {
        self.matched.map(ScheduleException::priority)
    }
}

/// Looks up overrides in an immutable list of exceptions.
#[derive(Debug, Clone, Copy)]
pub struct ExceptionResolver<'a> {
    exceptions: &'a [ScheduleException],
}

impl<'a> ExceptionResolver<'a> {
    /// Creates a resolver over `exceptions`.
    ///
    /// Nothing is validated here; the list may hold records for many
    /// employees, and a bad record only fails the employee it belongs to
    /// (see [`validate_for`](Self::validate_for)).
    pub fn new(exceptions: &'a [ScheduleException]) -> Self {
        Self { exceptions }
    }

    /// Validates the exceptions owned by `employee_id`.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidException`](crate::error::EngineError::InvalidException)
    /// for the first malformed one.
    pub fn validate_for(&self, employee_id: &str) -> EngineResult<()> {
        self.exceptions
            .iter()
            .filter(|e| e.employee_id == employee_id)
            .try_for_each(ScheduleException::validate)
    }

    /// Finds the exception overriding `date` for the given employee and
    /// assignment.
    ///
    /// # Example
    ///
    /// ```
    /// use attendance_engine::calculation::ExceptionResolver;
    /// use attendance_engine::models::{ExceptionRule, ScheduleException};
    /// use chrono::{NaiveDate, NaiveDateTime};
    ///
    /// let created = NaiveDateTime::parse_from_str("2024-01-01 09:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
    /// let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(); // a Monday
    /// let exceptions = vec![
    ///     ScheduleException {
    ///         id: "weekly".to_string(),
    ///         employee_id: "emp_001".to_string(),
    ///         assignment_id: None,
    ///         interval_id: "afternoon".to_string(),
    ///         created_at: created,
    ///         rule: ExceptionRule::Recurring { day_of_week: 1, valid_from: None, valid_to: None },
    ///     },
    ///     ScheduleException {
    ///         id: "one_off".to_string(),
    ///         employee_id: "emp_001".to_string(),
    ///         assignment_id: None,
    ///         interval_id: "night".to_string(),
    ///         created_at: created,
    ///         rule: ExceptionRule::SpecificDate { date },
    ///     },
    /// ];
    ///
    /// let resolver = ExceptionResolver::new(&exceptions);
    /// let found = resolver.find_override("emp_001", "asg_1", date);
    /// assert_eq!(found.matched.unwrap().id, "one_off");
    /// assert!(found.warning.is_none());
    /// ```
    pub fn find_override(
        &self,
        employee_id: &str,
        assignment_id: &str,
        date: NaiveDate,
    ) -> OverrideResolution<'a> {
        let candidates: Vec<&'a ScheduleException> = self
            .exceptions
            .iter()
            .filter(|e| e.targets(employee_id, assignment_id) && e.applies_on(date))
            .collect();

        for priority in [ExceptionPriority::SpecificDate, ExceptionPriority::Recurring] {
            let tier: Vec<&'a ScheduleException> = candidates
                .iter()
                .copied()
                .filter(|e| e.priority() == priority)
                .collect();
            if tier.is_empty() {
                continue;
            }

            let winner = tier
                .iter()
                .copied()
                .max_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));

            let warning = (tier.len() > 1)
                .then(|| conflict_warning(employee_id, date, &tier, winner));

            return OverrideResolution {
                matched: winner,
                warning,
            };
        }

        OverrideResolution {
            matched: None,
            warning: None,
        }
    }
}

fn conflict_warning(
    employee_id: &str,
    date: NaiveDate,
    tier: &[&ScheduleException],
    winner: Option<&ScheduleException>,
) -> ResolutionWarning {
    let mut related_ids: Vec<String> = tier.iter().map(|e| e.id.clone()).collect();
    related_ids.sort();
    let winner_id = winner.map(|e| e.id.as_str()).unwrap_or_default();

    warn!(
        employee_id = %employee_id,
        date = %date,
        exceptions = ?related_ids,
        applied = %winner_id,
        "Conflicting schedule exceptions"
    );

    ResolutionWarning {
        code: WarningCode::ConflictingExceptions,
        employee_id: employee_id.to_string(),
        date,
        message: format!(
            "{} exceptions match {}; applied most recent '{}'",
            tier.len(),
            date,
            winner_id
        ),
        related_ids,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::models::ExceptionRule;
    use chrono::NaiveDateTime;

    fn make_date(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
    }

    fn make_datetime(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn specific(id: &str, date: &str, created: &str) -> ScheduleException {
        ScheduleException {
            id: id.to_string(),
            employee_id: "emp_001".to_string(),
            assignment_id: None,
            interval_id: format!("ti_{}", id),
            created_at: make_datetime(created),
            rule: ExceptionRule::SpecificDate {
                date: make_date(date),
            },
        }
    }

    fn recurring(
        id: &str,
        day_of_week: u8,
        from: Option<&str>,
        to: Option<&str>,
        created: &str,
    ) -> ScheduleException {
        ScheduleException {
            id: id.to_string(),
            employee_id: "emp_001".to_string(),
            assignment_id: None,
            interval_id: format!("ti_{}", id),
            created_at: make_datetime(created),
            rule: ExceptionRule::Recurring {
                day_of_week,
                valid_from: from.map(make_date),
                valid_to: to.map(make_date),
            },
        }
    }

    #[test]
    fn test_no_exceptions_means_no_override() {
        let resolver = ExceptionResolver::new(&[]);
        let found = resolver.find_override("emp_001", "asg_1", make_date("2024-01-15"));
        assert!(found.matched.is_none());
        assert!(found.warning.is_none());
        assert_eq!(found.priority(), None);
    }

    #[test]
    fn test_specific_date_beats_newer_recurring() {
        let exceptions = vec![
            specific("d1", "2024-01-15", "2024-01-01 00:00:00"),
            recurring("r1", 1, None, None, "2024-01-10 00:00:00"),
        ];
        let resolver = ExceptionResolver::new(&exceptions);
        let found = resolver.find_override("emp_001", "asg_1", make_date("2024-01-15"));
        assert_eq!(found.matched.unwrap().id, "d1");
        assert_eq!(found.priority(), Some(ExceptionPriority::SpecificDate));
    }

    #[test]
    fn test_recurring_applies_on_matching_weekday() {
        let exceptions = vec![recurring("r1", 1, None, None, "2024-01-01 00:00:00")];
        let resolver = ExceptionResolver::new(&exceptions);

        let monday = resolver.find_override("emp_001", "asg_1", make_date("2024-01-22"));
        assert_eq!(monday.matched.unwrap().id, "r1");
        assert_eq!(monday.priority(), Some(ExceptionPriority::Recurring));

        let tuesday = resolver.find_override("emp_001", "asg_1", make_date("2024-01-23"));
        assert!(tuesday.matched.is_none());
    }

    #[test]
    fn test_recurring_outside_validity_does_not_apply() {
        let exceptions = vec![recurring(
            "r1",
            1,
            Some("2024-02-01"),
            None,
            "2024-01-01 00:00:00",
        )];
        let resolver = ExceptionResolver::new(&exceptions);
        let found = resolver.find_override("emp_001", "asg_1", make_date("2024-01-29"));
        assert!(found.matched.is_none());
    }

    #[test]
    fn test_conflicting_recurring_picks_most_recent_and_warns() {
        let exceptions = vec![
            recurring("older", 1, Some("2024-01-01"), None, "2024-01-01 08:00:00"),
            recurring("newer", 1, None, Some("2024-12-31"), "2024-01-05 08:00:00"),
        ];
        let resolver = ExceptionResolver::new(&exceptions);
        let found = resolver.find_override("emp_001", "asg_1", make_date("2024-01-15"));

        assert_eq!(found.matched.unwrap().id, "newer");
        let warning = found.warning.unwrap();
        assert_eq!(warning.code, WarningCode::ConflictingExceptions);
        assert_eq!(warning.related_ids, vec!["newer".to_string(), "older".to_string()]);
        assert_eq!(warning.date, make_date("2024-01-15"));
    }

    #[test]
    fn test_conflict_tie_break_is_deterministic() {
        let exceptions = vec![
            recurring("b", 1, None, None, "2024-01-01 08:00:00"),
            recurring("a", 1, None, None, "2024-01-01 08:00:00"),
        ];
        let resolver = ExceptionResolver::new(&exceptions);
        let first = resolver.find_override("emp_001", "asg_1", make_date("2024-01-15"));
        let reversed: Vec<ScheduleException> = exceptions.iter().rev().cloned().collect();
        let resolver = ExceptionResolver::new(&reversed);
        let second = resolver.find_override("emp_001", "asg_1", make_date("2024-01-15"));

        assert_eq!(first.matched.unwrap().id, second.matched.unwrap().id);
    }

    #[test]
    fn test_other_employee_exceptions_are_ignored() {
        let mut exception = specific("d1", "2024-01-15", "2024-01-01 00:00:00");
        exception.employee_id = "emp_002".to_string();
        let exceptions = vec![exception];
        let resolver = ExceptionResolver::new(&exceptions);
        let found = resolver.find_override("emp_001", "asg_1", make_date("2024-01-15"));
        assert!(found.matched.is_none());
    }

    #[test]
    fn test_validate_for_rejects_own_invalid_exception() {
        let exceptions = vec![recurring("bad", 9, None, None, "2024-01-01 00:00:00")];
        let resolver = ExceptionResolver::new(&exceptions);
        assert!(matches!(
            resolver.validate_for("emp_001"),
            Err(EngineError::InvalidException { exception_id, .. }) if exception_id == "bad"
        ));
    }

    #[test]
    fn test_validate_for_skips_other_employees() {
        let mut foreign = recurring("bad", 9, None, None, "2024-01-01 00:00:00");
        foreign.employee_id = "emp_999".to_string();
        let exceptions = vec![foreign, specific("d1", "2024-01-15", "2024-01-01 00:00:00")];
        let resolver = ExceptionResolver::new(&exceptions);

        assert_eq!(resolver.validate_for("emp_001"), Ok(()));
        let found = resolver.find_override("emp_001", "asg_1", make_date("2024-01-15"));
        assert_eq!(found.matched.unwrap().id, "d1");
    }
}
