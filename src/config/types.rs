//! Configuration types for schedule resolution.
//!
//! This module contains the records deserialized from the YAML catalog
//! files and the validated [`ScheduleCatalog`] they are converted into.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    BreakWindow, OvertimeLevel, PunchMargins, ShiftDefinition, TimeInterval, parse_time_of_day,
};

/// Engine-wide settings from `engine.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EngineSettings {
    /// Name of the deployment, used in log output.
    pub name: String,
    /// Size of the batch worker pool; defaults to the number of cores.
    #[serde(default)]
    pub workers: Option<usize>,
    /// Lateness allowance for intervals that do not declare one.
    #[serde(default)]
    pub allow_late_default_minutes: u32,
}

impl EngineSettings {
    /// Number of batch workers to run.
    pub fn worker_count(&self) -> usize {
        self.workers
            .filter(|w| *w > 0)
            .or_else(|| std::thread::available_parallelism().ok().map(|n| n.get()))
            .unwrap_or(1)
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            name: "attendance-engine".to_string(),
            workers: None,
            allow_late_default_minutes: 0,
        }
    }
}

/// A time interval as written in `time_intervals.yaml`.
///
/// Times of day are kept as strings until validated.
#[derive(Debug, Clone, Deserialize)]
pub struct TimeIntervalRecord {
    /// Unique identifier for the interval.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Entry time of day, `HH:MM` or `HH:MM:SS`.
    pub entry_time: String,
    /// Length in minutes.
    pub duration_minutes: u32,
    /// Break allowances.
    #[serde(default)]
    pub breaks: Vec<BreakWindow>,
    /// Punch-window margins.
    #[serde(default)]
    pub margins: PunchMargins,
    /// Overtime tiers.
    #[serde(default)]
    pub overtime_levels: Vec<OvertimeLevel>,
    /// Lateness allowance; the settings default applies when absent.
    #[serde(default)]
    pub allow_late_minutes: Option<u32>,
    /// Early departure allowance.
    #[serde(default)]
    pub allow_early_leave_minutes: u32,
}

impl TimeIntervalRecord {
    /// Converts the record into a validated [`TimeInterval`].
    pub fn into_interval(self, settings: &EngineSettings) -> EngineResult<TimeInterval> {
        let entry_time = parse_time_of_day(&self.entry_time, &format!("interval '{}'", self.id))?;
        let interval = TimeInterval {
            id: self.id,
            name: self.name,
            entry_time,
            duration_minutes: self.duration_minutes,
            breaks: self.breaks,
            margins: self.margins,
            overtime_levels: self.overtime_levels,
            allow_late_minutes: self
                .allow_late_minutes
                .unwrap_or(settings.allow_late_default_minutes),
            allow_early_leave_minutes: self.allow_early_leave_minutes,
        };
        interval.validate()?;
        Ok(interval)
    }
}

/// Layout of `time_intervals.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct TimeIntervalsFile {
    /// All interval records.
    pub time_intervals: Vec<TimeIntervalRecord>,
}

/// Layout of `shifts.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ShiftsFile {
    /// All shift definitions.
    pub shifts: Vec<ShiftDefinition>,
}

/// The validated set of time intervals and shifts a resolution pass reads.
///
/// Built once per request from the collaborator's snapshot (or loaded from
/// YAML) and treated as immutable for the rest of the pass.
#[derive(Debug, Clone, Default)]
pub struct ScheduleCatalog {
    intervals: HashMap<String, TimeInterval>,
    shifts: HashMap<String, ShiftDefinition>,
}

impl ScheduleCatalog {
    /// Builds a catalog, validating every interval and shift and every
    /// interval reference made by a shift.
    ///
    /// # Example
    ///
    /// ```
    /// use attendance_engine::config::ScheduleCatalog;
    /// use attendance_engine::models::{CycleDay, CycleUnit, ShiftDefinition};
    ///
    /// let shift = ShiftDefinition {
    ///     id: "office".to_string(),
    ///     name: "Office".to_string(),
    ///     cycle_length: 7,
    ///     cycle_unit: CycleUnit::Day,
    ///     days: vec![CycleDay {
    ///         day_index: 0,
    ///         interval_id: Some("missing".to_string()),
    ///         day_off: false,
    ///     }],
    ///     works_weekends: false,
    ///     works_days_off: false,
    /// };
    ///
    /// assert!(ScheduleCatalog::new(vec![], vec![shift]).is_err());
    /// ```
    pub fn new(intervals: Vec<TimeInterval>, shifts: Vec<ShiftDefinition>) -> EngineResult<Self> {
        let mut interval_map = HashMap::with_capacity(intervals.len());
        for interval in intervals {
            interval.validate()?;
            interval_map.insert(interval.id.clone(), interval);
        }

        let mut shift_map = HashMap::with_capacity(shifts.len());
        for shift in shifts {
            shift.validate()?;
            for day in &shift.days {
                if let Some(id) = &day.interval_id {
                    if !interval_map.contains_key(id) {
                        return Err(EngineError::UnknownTimeInterval {
                            interval_id: id.clone(),
                            referenced_by: format!("shift '{}'", shift.id),
                        });
                    }
                }
            }
            shift_map.insert(shift.id.clone(), shift);
        }

        Ok(Self {
            intervals: interval_map,
            shifts: shift_map,
        })
    }

    /// Looks up a time interval.
    pub fn interval(&self, id: &str) -> Option<&TimeInterval> {
        self.intervals.get(id)
    }

    /// Looks up a shift.
    pub fn shift(&self, id: &str) -> Option<&ShiftDefinition> {
        self.shifts.get(id)
    }

    /// All intervals, keyed by ID.
    pub fn intervals(&self) -> &HashMap<String, TimeInterval> {
        &self.intervals
    }

    /// All shifts, keyed by ID.
    pub fn shifts(&self) -> &HashMap<String, ShiftDefinition> {
        &self.shifts
    }
}
