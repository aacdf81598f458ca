//! Workflow-stage normalization and per-issue metric derivation
//!
//! The pipeline: raw status history → [`StageClassifier`] + [`TimestampExtractor`]
//! → canonical stage timestamps → [`StageDurations`] + [`ChurnCounts`] → one
//! [`IssueMetrics`](crate::models::IssueMetrics) record per issue.
//!
//! Every step is a pure function of one issue's history; batch derivation is
//! embarrassingly parallel and runs on the rayon pool.

pub mod churn;
pub mod durations;
pub mod extractor;
pub mod stage;

pub use churn::ChurnCounts;
pub use durations::{duration_days, round_days, StageDurations};
pub use extractor::TimestampExtractor;
pub use stage::{ArrivalPolicy, StageClassifier, StageVocabulary, WorkflowStage};

use crate::models::{IssueAnalysis, IssueMetrics, RawIssue};
use rayon::prelude::*;

/// Derive flow metrics for one issue.
pub fn derive_issue_metrics(issue: &RawIssue, classifier: &StageClassifier) -> IssueMetrics {
    let timestamps = TimestampExtractor::new(classifier).extract(issue);
    let durations = StageDurations::from_timestamps(&timestamps);
    let churn = ChurnCounts::from_history(&issue.sorted_status_changes(), classifier);

    IssueMetrics {
        lead_time: durations.lead_time,
        cycle_time: durations.cycle_time,
        grooming_cycle_time: durations.grooming_cycle_time,
        dev_cycle_time: durations.dev_cycle_time,
        qa_cycle_time: durations.qa_cycle_time,
        blockers: churn.blockers,
        review_churn: churn.review_churn,
        qa_churn: churn.qa_churn,
        timestamps,
    }
}

/// Derive metrics for a batch of issues, joined with their identity fields.
///
/// Per-issue derivation shares no mutable state and runs in parallel; the
/// returned collection is the materialized snapshot the aggregate calculators
/// consume. Issue order is preserved.
pub fn analyze_issues(issues: &[RawIssue], classifier: &StageClassifier) -> Vec<IssueAnalysis> {
    issues
        .par_iter()
        .map(|issue| IssueAnalysis {
            key: issue.key.clone(),
            issue_type: issue.issue_type.clone(),
            project_key: issue.project_key.clone(),
            priority: issue.priority.clone(),
            sprint_name: issue.sprint_name.clone(),
            story_points: issue.story_points,
            created_at: issue.created_at,
            resolved_at: issue.resolved_at,
            metrics: derive_issue_metrics(issue, classifier),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawStatusChange;
    use chrono::{DateTime, TimeZone, Utc};

    fn ts(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 9, 0, 0).unwrap()
    }

    fn flow_issue(key: &str) -> RawIssue {
        let mut issue = RawIssue::new(
            key.to_string(),
            "Story".to_string(),
            "PROJ".to_string(),
            ts(1),
        );
        issue.status_changes = vec![
            RawStatusChange::status(None, "Ready for Grooming", ts(2)),
            RawStatusChange::status(Some("Ready for Grooming"), "In Progress", ts(3)),
            RawStatusChange::status(Some("In Progress"), "In QA", ts(5)),
            RawStatusChange::status(Some("In QA"), "Done", ts(6)),
        ];
        issue.resolved_at = Some(ts(6));
        issue
    }

    #[test]
    fn test_end_to_end_derivation() {
        let classifier = StageClassifier::default();
        let metrics = derive_issue_metrics(&flow_issue("PROJ-1"), &classifier);

        assert!((metrics.grooming_cycle_time.unwrap() - 1.0).abs() < 1e-9);
        assert!((metrics.dev_cycle_time.unwrap() - 2.0).abs() < 1e-9);
        assert!((metrics.qa_cycle_time.unwrap() - 1.0).abs() < 1e-9);
        assert!((metrics.cycle_time.unwrap() - 3.0).abs() < 1e-9);
        assert!((metrics.lead_time.unwrap() - 5.0).abs() < 1e-9);
        assert_eq!(metrics.review_churn, 0);
        assert_eq!(metrics.qa_churn, 1);
        assert_eq!(metrics.blockers, 0);
    }

    #[test]
    fn test_analyze_issues_preserves_order_and_identity() {
        let classifier = StageClassifier::default();
        let issues = vec![flow_issue("PROJ-1"), flow_issue("PROJ-2")];

        let analyses = analyze_issues(&issues, &classifier);
        assert_eq!(analyses.len(), 2);
        assert_eq!(analyses[0].key, "PROJ-1");
        assert_eq!(analyses[1].key, "PROJ-2");
        assert!(analyses[0].is_resolved());
        assert!(analyses[0].metrics.lead_time.is_some());
    }

    #[test]
    fn test_issue_with_empty_history_yields_null_metrics() {
        let classifier = StageClassifier::default();
        let issue = RawIssue::new(
            "PROJ-9".to_string(),
            "Task".to_string(),
            "PROJ".to_string(),
            ts(1),
        );

        let metrics = derive_issue_metrics(&issue, &classifier);
        assert!(metrics.lead_time.is_none());
        assert!(metrics.cycle_time.is_none());
        assert_eq!(metrics.blockers, 0);
        assert_eq!(metrics.timestamps.opened, Some(ts(1)));
    }
}
