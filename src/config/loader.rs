//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the schedule
//! catalog and engine settings from YAML files.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{EngineError, EngineResult};

use super::types::{EngineSettings, ScheduleCatalog, ShiftsFile, TimeIntervalsFile};

/// Loads and provides access to the schedule catalog.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// ├── engine.yaml          # Engine settings
/// ├── time_intervals.yaml  # Work-time templates
/// └── shifts.yaml          # Shift cycles
/// ```
///
/// # Example
///
/// ```no_run
/// use attendance_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default")?;
/// let shift = loader.catalog().shift("office").unwrap();
/// println!("Cycle of {} days", shift.cycle_days());
/// # Ok::<(), attendance_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    settings: EngineSettings,
    catalog: ScheduleCatalog,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Returns an error if any file is missing or is not valid YAML, if a
    /// time of day is malformed, or if the catalog fails validation.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let settings = Self::load_yaml::<EngineSettings>(&path.join("engine.yaml"))?;
        let intervals_file =
            Self::load_yaml::<TimeIntervalsFile>(&path.join("time_intervals.yaml"))?;
        let shifts_file = Self::load_yaml::<ShiftsFile>(&path.join("shifts.yaml"))?;

        let intervals = intervals_file
            .time_intervals
            .into_iter()
            .map(|record| record.into_interval(&settings))
            .collect::<EngineResult<Vec<_>>>()?;

        let catalog = ScheduleCatalog::new(intervals, shifts_file.shifts)?;

        debug!(
            name = %settings.name,
            intervals = catalog.intervals().len(),
            shifts = catalog.shifts().len(),
            "Loaded schedule catalog"
        );

        Ok(Self { settings, catalog })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the engine settings.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Returns the schedule catalog.
    pub fn catalog(&self) -> &ScheduleCatalog {
        &self.catalog
    }

    /// Consumes the loader, returning the catalog.
    pub fn into_catalog(self) -> ScheduleCatalog {
        self.catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn config_path() -> &'static str {
        "./config/default"
    }

    #[test]
    fn test_load_valid_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

        let loader = result.unwrap();
        assert_eq!(loader.settings().name, "default");
        assert_eq!(loader.settings().allow_late_default_minutes, 10);
    }

    #[test]
    fn test_intervals_loaded_with_parsed_times() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        let morning = loader.catalog().interval("morning").unwrap();
        assert_eq!(morning.entry_time, NaiveTime::from_hms_opt(8, 0, 0).unwrap());
        assert_eq!(morning.duration_minutes, 540);
        assert_eq!(morning.allow_late_minutes, 15);
        assert_eq!(morning.unpaid_break_minutes(), 60);

        let night = loader.catalog().interval("night").unwrap();
        assert!(night.crosses_midnight());
        // Falls back to the settings default.
        assert_eq!(night.allow_late_minutes, 10);
    }

    #[test]
    fn test_shifts_loaded() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        let office = loader.catalog().shift("office").unwrap();
        assert_eq!(office.cycle_days(), 7);
        assert_eq!(office.interval_at(0), Some("morning"));
        assert!(!office.works_weekends);

        let rotation = loader.catalog().shift("rotation").unwrap();
        assert_eq!(rotation.cycle_days(), 4);
        assert!(rotation.works_weekends);
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        let result = ConfigLoader::load("/nonexistent/path");

        match result {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.contains("engine.yaml"));
            }
            _ => panic!("Expected ConfigNotFound error"),
        }
    }
}
