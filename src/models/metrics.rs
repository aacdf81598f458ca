//! Derived per-issue metric records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canonical workflow-stage arrival timestamps for one issue.
///
/// Derived fresh from the status-change history on every computation; never
/// persisted. Each field is `None` when the issue never reached the stage
/// (or the raw status was not recognized).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StageTimestamps {
    /// Issue creation (taken from `created_at`, not from the history)
    pub opened: Option<DateTime<Utc>>,

    /// First arrival in Ready for Grooming
    pub ready_for_grooming: Option<DateTime<Utc>>,

    /// First arrival in Ready for Dev
    pub ready_for_dev: Option<DateTime<Utc>>,

    /// First arrival in In Progress
    pub in_progress: Option<DateTime<Utc>>,

    /// First arrival in In Review
    pub in_review: Option<DateTime<Utc>>,

    /// Last arrival in QA (a later QA entry after rework supersedes earlier ones)
    pub in_qa: Option<DateTime<Utc>>,

    /// First arrival in Ready for Release
    pub ready_for_release: Option<DateTime<Utc>>,

    /// Last arrival in Done
    pub done: Option<DateTime<Utc>>,
}

/// Derived flow metrics for one issue.
///
/// All duration fields are fractional days and are `None` unless both endpoint
/// timestamps exist and the later one strictly follows the earlier one.
/// Negative or zero deltas are suppressed as `None`, not reported as zero, so
/// data anomalies never show up as misleadingly fast issues.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssueMetrics {
    /// Days from creation to final Done
    pub lead_time: Option<f64>,

    /// Days from first In Progress to final Done
    pub cycle_time: Option<f64>,

    /// Days from first Ready for Grooming to first In Progress
    pub grooming_cycle_time: Option<f64>,

    /// Days from first In Progress to last QA entry
    pub dev_cycle_time: Option<f64>,

    /// Days from last QA entry to final Done
    pub qa_cycle_time: Option<f64>,

    /// Transitions into a Blocked status
    pub blockers: u32,

    /// Transitions into In Review (every occurrence, first entry included)
    pub review_churn: u32,

    /// Transitions into QA (every occurrence, first entry included)
    pub qa_churn: u32,

    /// Canonical stage timestamps the durations were derived from
    pub timestamps: StageTimestamps,
}

impl IssueMetrics {
    /// Total active working time in days (grooming + dev + qa, missing legs as 0)
    pub fn active_time(&self) -> f64 {
        self.grooming_cycle_time.unwrap_or(0.0)
            + self.dev_cycle_time.unwrap_or(0.0)
            + self.qa_cycle_time.unwrap_or(0.0)
    }

    /// Whether the issue went through review and QA without any rework cycle.
    ///
    /// "Clean" here means the stages were never entered at all; an issue that
    /// passed review once still records `review_churn == 1`.
    pub fn is_first_time_through(&self) -> bool {
        self.review_churn == 0 && self.qa_churn == 0
    }
}

/// Per-issue metrics joined with the identifying fields the UI renders.
///
/// This is the outbound row contract for the issue table and the input to the
/// aggregate flow calculators, which need the resolution status, type and
/// priority alongside the derived durations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueAnalysis {
    /// Tracker key
    pub key: String,

    /// Issue type as imported
    pub issue_type: String,

    /// Owning project key
    pub project_key: String,

    /// Priority label, if set
    pub priority: Option<String>,

    /// Sprint, if any
    pub sprint_name: Option<String>,

    /// Story point estimate, if estimated
    pub story_points: Option<f64>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Resolution timestamp; `None` while open
    pub resolved_at: Option<DateTime<Utc>>,

    /// Derived flow metrics
    pub metrics: IssueMetrics,
}

impl IssueAnalysis {
    /// Whether the underlying issue has been resolved
    pub fn is_resolved(&self) -> bool {
        self.resolved_at.is_some()
    }

    /// Days from creation to resolution, when resolved
    pub fn resolution_days(&self) -> Option<f64> {
        let resolved = self.resolved_at?;
        let ms = resolved.signed_duration_since(self.created_at).num_milliseconds();
        Some(ms as f64 / 86_400_000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_time_treats_missing_legs_as_zero() {
        let metrics = IssueMetrics {
            grooming_cycle_time: Some(1.5),
            qa_cycle_time: Some(0.5),
            ..Default::default()
        };
        assert!((metrics.active_time() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_first_time_through_requires_no_stage_entry() {
        let clean = IssueMetrics::default();
        assert!(clean.is_first_time_through());

        let reworked = IssueMetrics {
            review_churn: 1,
            ..Default::default()
        };
        assert!(!reworked.is_first_time_through());
    }
}
