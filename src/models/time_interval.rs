//! Time interval model and related types.
//!
//! A [`TimeInterval`] is a named work-time template: when work starts, how
//! long it lasts, the breaks inside it, how far around entry and exit a
//! punch is still accepted, the lateness allowances, and the overtime tiers.
//! The exit is never stored as a time of day; it is always derived as an
//! offset from the entry so shifts crossing midnight need no special case.

use chrono::{Duration, NaiveTime, Timelike};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Maximum number of overtime tiers a time interval may declare.
pub const MAX_OVERTIME_LEVELS: usize = 3;

/// A break allowance inside a time interval.
///
/// Breaks are positioned as an offset from the interval entry, not as a
/// time of day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakWindow {
    /// Label for the break (e.g. "lunch").
    #[serde(default)]
    pub name: String,
    /// Minutes after entry at which the break starts.
    pub offset_minutes: u32,
    /// Length of the break in minutes.
    pub duration_minutes: u32,
    /// Whether the break is paid (true) or unpaid (false).
    #[serde(default)]
    pub is_paid: bool,
}

/// Punch-window margins around the expected entry and exit, in minutes.
///
/// The entry window is `[entry - entry_from, entry + entry_to]` and the exit
/// window is `[exit - exit_from, exit + exit_to]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PunchMargins {
    /// Minutes before the expected entry at which entry punches are accepted.
    pub entry_from: u32,
    /// Minutes after the expected entry until which entry punches are accepted.
    pub entry_to: u32,
    /// Minutes before the expected exit at which exit punches are accepted.
    pub exit_from: u32,
    /// Minutes after the expected exit until which exit punches are accepted.
    pub exit_to: u32,
}

/// One overtime tier.
///
/// Extra worked minutes past `after_minutes` fall into this level until the
/// next level's threshold is reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeLevel {
    /// Tier number, 1 to 3.
    pub level: u8,
    /// Extra minutes after which this tier starts.
    pub after_minutes: u32,
    /// Pay multiplier for this tier as a percentage (e.g. 150).
    pub percentage: Decimal,
}

/// A work-time template.
///
/// # Example
///
/// ```
/// use attendance_engine::models::{PunchMargins, TimeInterval};
/// use chrono::NaiveTime;
///
/// let night = TimeInterval {
///     id: "night".to_string(),
///     name: "Night".to_string(),
///     entry_time: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
///     duration_minutes: 480,
///     breaks: vec![],
///     margins: PunchMargins::default(),
///     overtime_levels: vec![],
///     allow_late_minutes: 10,
///     allow_early_leave_minutes: 0,
/// };
///
/// assert_eq!(night.exit_time(), NaiveTime::from_hms_opt(6, 0, 0).unwrap());
/// assert!(night.crosses_midnight());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInterval {
    /// Unique identifier for the interval.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Expected entry time of day.
    pub entry_time: NaiveTime,
    /// Length of the interval in minutes, breaks included.
    pub duration_minutes: u32,
    /// Break allowances.
    #[serde(default)]
    pub breaks: Vec<BreakWindow>,
    /// Punch-window margins.
    #[serde(default)]
    pub margins: PunchMargins,
    /// Overtime tiers, ordered by level.
    #[serde(default)]
    pub overtime_levels: Vec<OvertimeLevel>,
    /// Lateness (in minutes) still classified as punctual.
    #[serde(default)]
    pub allow_late_minutes: u32,
    /// Early departure (in minutes) tolerated before it is recorded.
    #[serde(default)]
    pub allow_early_leave_minutes: u32,
}

impl TimeInterval {
    /// The computed exit time of day (entry + duration, wrapping at midnight).
    pub fn exit_time(&self) -> NaiveTime {
        let (exit, _) = self
            .entry_time
            .overflowing_add_signed(Duration::minutes(i64::from(self.duration_minutes)));
        exit
    }

    /// Returns true if the exit falls on a later calendar day than the entry.
    pub fn crosses_midnight(&self) -> bool {
        let entry_minutes = i64::from(self.entry_time.num_seconds_from_midnight() / 60);
        entry_minutes + i64::from(self.duration_minutes) > 24 * 60
    }

    /// Total unpaid break minutes.
    pub fn unpaid_break_minutes(&self) -> i64 {
        self.breaks
            .iter()
            .filter(|b| !b.is_paid)
            .map(|b| i64::from(b.duration_minutes))
            .sum()
    }

    /// Minutes the employee is expected to work (duration minus unpaid breaks).
    pub fn expected_worked_minutes(&self) -> i64 {
        i64::from(self.duration_minutes) - self.unpaid_break_minutes()
    }

    /// Checks the interval for internal consistency.
    ///
    /// Rejects a zero duration, breaks that extend past the end of the
    /// interval, more than three overtime tiers, tiers outside 1..=3 and
    /// tier thresholds that do not strictly increase.
    pub fn validate(&self) -> EngineResult<()> {
        let invalid = |message: String| EngineError::InvalidTimeInterval {
            interval_id: self.id.clone(),
            message,
        };

        if self.duration_minutes == 0 {
            return Err(invalid("duration must be positive".to_string()));
        }

        for b in &self.breaks {
            let break_end = u64::from(b.offset_minutes) + u64::from(b.duration_minutes);
            if break_end > u64::from(self.duration_minutes) {
                return Err(invalid(format!(
                    "break '{}' ends after the interval",
                    b.name
                )));
            }
        }

        if self.overtime_levels.len() > MAX_OVERTIME_LEVELS {
            return Err(invalid(format!(
                "at most {} overtime levels are allowed, got {}",
                MAX_OVERTIME_LEVELS,
                self.overtime_levels.len()
            )));
        }

        let mut previous: Option<&OvertimeLevel> = None;
        for level in &self.overtime_levels {
            if !(1..=MAX_OVERTIME_LEVELS as u8).contains(&level.level) {
                return Err(invalid(format!("overtime level {} out of range", level.level)));
            }
            if let Some(prev) = previous {
                if level.level <= prev.level || level.after_minutes <= prev.after_minutes {
                    return Err(invalid(
                        "overtime levels must be ordered with increasing thresholds".to_string(),
                    ));
                }
            }
            previous = Some(level);
        }

        Ok(())
    }
}

/// Parses a time-of-day string in `HH:MM` or `HH:MM:SS` form.
///
/// `entity` names the record the value came from and is carried into the
/// error.
///
/// # Example
///
/// ```
/// use attendance_engine::models::parse_time_of_day;
/// use chrono::NaiveTime;
///
/// let t = parse_time_of_day("07:30", "interval 'early'").unwrap();
/// assert_eq!(t, NaiveTime::from_hms_opt(7, 30, 0).unwrap());
/// assert!(parse_time_of_day("7h30", "interval 'early'").is_err());
/// ```
pub fn parse_time_of_day(value: &str, entity: &str) -> EngineResult<NaiveTime> {
    let trimmed = value.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .map_err(|_| EngineError::MalformedTimeOfDay {
            entity: entity.to_string(),
            value: value.to_string(),
        })
}
