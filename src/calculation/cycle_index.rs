//! Cycle position arithmetic.
//!
//! Maps a calendar date to its position within a shift's repeating cycle.

use chrono::NaiveDate;

use crate::error::{EngineError, EngineResult};

/// Returns the cycle position of `target` for a cycle starting on `start`.
///
/// The result is always in `0..cycle_length`, including for dates before
/// `start`, so historical ranges can be previewed with the same arithmetic.
///
/// # Errors
///
/// [`EngineError::InvalidCycle`] when `cycle_length` is zero or negative,
/// or too long for a position to fit in a `u32`.
///
/// # Example
///
/// ```
/// use attendance_engine::calculation::index_for;
/// use chrono::NaiveDate;
///
/// let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
///
/// assert_eq!(index_for(start, 7, start).unwrap(), 0);
/// assert_eq!(index_for(start, 7, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()).unwrap(), 2);
/// // The day before the start is the last position of the previous cycle.
/// assert_eq!(index_for(start, 7, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()).unwrap(), 6);
/// ```
pub fn index_for(start: NaiveDate, cycle_length: i64, target: NaiveDate) -> EngineResult<u32> {
    if cycle_length <= 0 {
        return Err(EngineError::InvalidCycle { cycle_length });
    }
    let offset = (target - start).num_days();
    u32::try_from(offset.rem_euclid(cycle_length))
        .map_err(|_| EngineError::InvalidCycle { cycle_length })
}
