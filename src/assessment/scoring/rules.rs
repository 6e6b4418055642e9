use tracing::warn;

use crate::assessment::domain::QuestionId;

/// `value / max_points * 100`. A non-positive `max_points` is a data
/// integrity problem in the catalog entry: log and substitute 0 so the
/// session keeps going.
pub(crate) fn direct(value: f64, max_points: f64, question: &QuestionId) -> f64 {
    if max_points <= 0.0 {
        warn!(%question, max_points, "direct rule with non-positive max_points, scoring 0");
        return 0.0;
    }
    (value / max_points * 100.0).clamp(0.0, 100.0)
}

/// 1-based ordinal index into a weight table, clamped at both ends rather
/// than erroring. An empty table is rejected at catalog load, but guard
/// anyway.
pub(crate) fn weighted(value: f64, weights: &[f64], question: &QuestionId) -> f64 {
    if weights.is_empty() {
        warn!(%question, "weighted rule with empty table, scoring 0");
        return 0.0;
    }
    let last = weights.len() as i64 - 1;
    let index = (value.round() as i64 - 1).clamp(0, last) as usize;
    weights[index] * 100.0
}

/// Already a 0-100 percentage; clamp and pass through.
pub(crate) fn percentage(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

/// Higher rank (worse position) costs 20 points per step; 0-based rank.
pub(crate) fn rank_penalty(rank: u32) -> f64 {
    (100.0 - f64::from(rank) * 20.0).max(0.0)
}
