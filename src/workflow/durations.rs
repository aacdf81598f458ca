//! Duration derivation from canonical stage timestamps

use crate::models::StageTimestamps;
use chrono::{DateTime, Utc};

const MS_PER_DAY: f64 = 86_400_000.0;

/// Named duration metrics derived from stage timestamp pairs.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StageDurations {
    pub lead_time: Option<f64>,
    pub cycle_time: Option<f64>,
    pub grooming_cycle_time: Option<f64>,
    pub dev_cycle_time: Option<f64>,
    pub qa_cycle_time: Option<f64>,
}

impl StageDurations {
    /// Derive all duration metrics from one issue's stage timestamps.
    ///
    /// Each metric is defined only when both endpoints exist and the later one
    /// strictly follows the earlier one.
    pub fn from_timestamps(timestamps: &StageTimestamps) -> Self {
        Self {
            lead_time: duration_days(timestamps.opened, timestamps.done),
            cycle_time: duration_days(timestamps.in_progress, timestamps.done),
            grooming_cycle_time: duration_days(
                timestamps.ready_for_grooming,
                timestamps.in_progress,
            ),
            dev_cycle_time: duration_days(timestamps.in_progress, timestamps.in_qa),
            qa_cycle_time: duration_days(timestamps.in_qa, timestamps.done),
        }
    }
}

/// Fractional days between two optional instants.
///
/// `None` when either endpoint is missing or the delta is not strictly
/// positive. Zero and negative deltas are suppressed rather than reported, so
/// clock anomalies in imported history never surface as instant completions.
pub fn duration_days(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Option<f64> {
    let (start, end) = (start?, end?);
    if end <= start {
        return None;
    }
    let ms = end.signed_duration_since(start).num_milliseconds();
    Some(ms as f64 / MS_PER_DAY)
}

/// Round a duration to the single decimal the dashboard displays.
pub fn round_days(days: f64) -> f64 {
    (days * 10.0).round() / 10.0
}
