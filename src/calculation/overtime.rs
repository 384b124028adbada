//! Overtime tier allocation.

use crate::models::{OvertimeLevel, OvertimeSplit};

/// Splits `extra_minutes` worked beyond the expected duration across the
/// interval's overtime tiers.
///
/// Each level receives the minutes between its own `after_minutes`
/// threshold and the next level's threshold; the last level is open-ended.
/// Minutes below the first threshold are not overtime. Levels with nothing
/// allocated are omitted.
///
/// # Example
///
/// ```
/// use attendance_engine::calculation::split_overtime;
/// use attendance_engine::models::OvertimeLevel;
/// use rust_decimal::Decimal;
///
/// let levels = vec![
///     OvertimeLevel { level: 1, after_minutes: 30, percentage: Decimal::new(125, 0) },
///     OvertimeLevel { level: 2, after_minutes: 120, percentage: Decimal::new(150, 0) },
/// ];
///
/// let splits = split_overtime(150, &levels);
/// assert_eq!(splits.len(), 2);
/// assert_eq!(splits[0].minutes, 90);
/// assert_eq!(splits[1].minutes, 30);
/// ```
pub fn split_overtime(extra_minutes: i64, levels: &[OvertimeLevel]) -> Vec<OvertimeSplit> {
    if extra_minutes <= 0 {
        return Vec::new();
    }

    let mut ordered: Vec<&OvertimeLevel> = levels.iter().collect();
    ordered.sort_by_key(|l| l.after_minutes);

    ordered
        .iter()
        .enumerate()
        .filter_map(|(i, level)| {
            let lower = i64::from(level.after_minutes);
            let upper = ordered
                .get(i + 1)
                .map(|next| i64::from(next.after_minutes))
                .unwrap_or(i64::MAX);
            let minutes = extra_minutes.min(upper) - lower;
            (minutes > 0).then(|| OvertimeSplit {
                level: level.level,
                minutes,
                percentage: level.percentage,
            })
        })
        .collect()
}
