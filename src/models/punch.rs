//! Punch events and leave facts.
//!
//! These are the raw observations the classifier works on. They arrive
//! already queried from the operational store; the engine never fetches
//! them itself.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Direction of a punch, when the device or row records it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PunchType {
    /// Clocking in.
    #[serde(alias = "Entrada")]
    Entry,
    /// Clocking out.
    #[serde(alias = "Salida")]
    Exit,
}

/// A manual correction replacing a raw punch.
///
/// Only honoured when both a reason and an approver are present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualAdjustment {
    /// The corrected timestamp.
    pub timestamp: NaiveDateTime,
    /// Why the punch was corrected; carried verbatim into the result.
    pub reason: String,
    /// Who approved the correction.
    pub approver: String,
}

impl ManualAdjustment {
    /// Returns true when the adjustment carries both a reason and an approver.
    pub fn is_approved(&self) -> bool {
        !self.reason.trim().is_empty() && !self.approver.trim().is_empty()
    }
}

/// A single recorded punch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Punch {
    /// The employee who punched.
    pub employee_id: String,
    /// When the punch was recorded.
    pub timestamp: NaiveDateTime,
    /// Direction, if known.
    #[serde(default)]
    pub punch_type: Option<PunchType>,
    /// Where the punch came from (device id, "web", "manual", ...).
    #[serde(default)]
    pub source: Option<String>,
    /// Manual correction superseding `timestamp`.
    #[serde(default)]
    pub adjustment: Option<ManualAdjustment>,
}

impl Punch {
    /// Creates a raw punch with no type, source or adjustment.
    pub fn at(employee_id: impl Into<String>, timestamp: NaiveDateTime) -> Self {
        Self {
            employee_id: employee_id.into(),
            timestamp,
            punch_type: None,
            source: None,
            adjustment: None,
        }
    }

    /// The approved manual adjustment, if any.
    pub fn approved_adjustment(&self) -> Option<&ManualAdjustment> {
        self.adjustment.as_ref().filter(|a| a.is_approved())
    }

    /// The timestamp used for classification: the approved manual
    /// correction when present, the raw timestamp otherwise.
    pub fn effective_timestamp(&self) -> NaiveDateTime {
        self.approved_adjustment()
            .map(|a| a.timestamp)
            .unwrap_or(self.timestamp)
    }

    /// The remark to carry into the classified record.
    pub fn remark(&self) -> Option<&str> {
        self.approved_adjustment().map(|a| a.reason.as_str())
    }

    /// Returns true if the punch may serve as an entry mark.
    pub fn can_be_entry(&self) -> bool {
        self.punch_type != Some(PunchType::Exit)
    }

    /// Returns true if the punch may serve as an exit mark.
    pub fn can_be_exit(&self) -> bool {
        self.punch_type != Some(PunchType::Entry)
    }
}

/// Kind of leave short-circuiting punch classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveKind {
    /// Paid vacation.
    Vacation,
    /// Any other permit (medical, personal, ...).
    Permission,
}

impl LeaveKind {
    /// Maps a permit-type label from the attendance store.
    ///
    /// Labels naming vacation map to [`LeaveKind::Vacation`]; every other
    /// non-empty label is a permission.
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized = label.trim().to_lowercase();
        if normalized.is_empty() {
            None
        } else if normalized.starts_with("vacacion") || normalized.starts_with("vacation") {
            Some(LeaveKind::Vacation)
        } else {
            Some(LeaveKind::Permission)
        }
    }
}

/// An approved leave covering one employee on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveFact {
    /// The employee on leave.
    pub employee_id: String,
    /// The covered date.
    pub date: NaiveDate,
    /// Vacation or permission.
    pub kind: LeaveKind,
    /// The original permit-type label, if one was supplied.
    #[serde(default)]
    pub label: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_datetime(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_effective_timestamp_uses_approved_adjustment() {
        let mut punch = Punch::at("emp_001", make_datetime("2024-01-08 08:40:00"));
        punch.adjustment = Some(ManualAdjustment {
            timestamp: make_datetime("2024-01-08 08:00:00"),
            reason: "Reloj fuera de servicio".to_string(),
            approver: "sup_01".to_string(),
        });
        assert_eq!(
            punch.effective_timestamp(),
            make_datetime("2024-01-08 08:00:00")
        );
        assert_eq!(punch.remark(), Some("Reloj fuera de servicio"));
    }

    #[test]
    fn test_unapproved_adjustment_is_ignored() {
        let mut punch = Punch::at("emp_001", make_datetime("2024-01-08 08:40:00"));
        punch.adjustment = Some(ManualAdjustment {
            timestamp: make_datetime("2024-01-08 08:00:00"),
            reason: "forgot badge".to_string(),
            approver: "  ".to_string(),
        });
        assert_eq!(
            punch.effective_timestamp(),
            make_datetime("2024-01-08 08:40:00")
        );
        assert_eq!(punch.remark(), None);
    }

    #[test]
    fn test_typed_punches_restrict_role() {
        let mut punch = Punch::at("emp_001", make_datetime("2024-01-08 08:00:00"));
        assert!(punch.can_be_entry() && punch.can_be_exit());
        punch.punch_type = Some(PunchType::Exit);
        assert!(!punch.can_be_entry());
        assert!(punch.can_be_exit());
    }

    #[test]
    fn test_leave_kind_from_label() {
        assert_eq!(LeaveKind::from_label("Vacaciones"), Some(LeaveKind::Vacation));
        assert_eq!(LeaveKind::from_label("VACATION"), Some(LeaveKind::Vacation));
        assert_eq!(LeaveKind::from_label("Licencia medica"), Some(LeaveKind::Permission));
        assert_eq!(LeaveKind::from_label("   "), None);
    }

    #[test]
    fn test_punch_type_accepts_spanish_labels() {
        let entry: PunchType = serde_json::from_str("\"Entrada\"").unwrap();
        let exit: PunchType = serde_json::from_str("\"EXIT\"").unwrap();
        assert_eq!(entry, PunchType::Entry);
        assert_eq!(exit, PunchType::Exit);
    }
}
