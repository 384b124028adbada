//! Shift schedule resolution and punch classification.
//!
//! This crate resolves, for any employee and date range, the work schedule
//! in effect on each day (cyclic shifts, date-specific and recurring
//! exceptions, overnight intervals) and classifies punches against it to
//! produce punctuality states and per-employee attendance summaries.

#![warn(missing_docs)]

pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
