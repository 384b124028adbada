//! Configuration loading and management for the attendance engine.
//!
//! This module loads the schedule catalog (time intervals and shift cycles)
//! and engine settings from YAML files, and validates catalogs built from
//! in-memory snapshots.
//!
//! # Example
//!
//! ```no_run
//! use attendance_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("Loaded {} shifts", config.catalog().shifts().len());
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{EngineSettings, ScheduleCatalog, ShiftsFile, TimeIntervalRecord, TimeIntervalsFile};
