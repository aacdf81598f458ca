//! Canonical stage timestamp extraction from status-change histories

use crate::models::{RawIssue, StageTimestamps};
use crate::workflow::stage::{ArrivalPolicy, StageClassifier, WorkflowStage};
use chrono::{DateTime, Utc};

/// Walks an issue's time-ordered status history and records one arrival
/// timestamp per canonical stage.
pub struct TimestampExtractor<'a> {
    classifier: &'a StageClassifier,
}

impl<'a> TimestampExtractor<'a> {
    pub fn new(classifier: &'a StageClassifier) -> Self {
        Self { classifier }
    }

    /// Extract canonical stage timestamps for one issue.
    ///
    /// Single linear pass over the sorted history. `opened` comes from the
    /// issue's `created_at`, not from the history. Unrecognized statuses and
    /// non-status field changes are skipped silently; malformed history
    /// degrades to `None` slots, never an error.
    pub fn extract(&self, issue: &RawIssue) -> StageTimestamps {
        let mut timestamps = StageTimestamps {
            opened: Some(issue.created_at),
            ..Default::default()
        };

        for change in issue.sorted_status_changes() {
            if !change.is_status_change() {
                continue;
            }
            for stage in self.classifier.classify(&change.to_value) {
                record_arrival(&mut timestamps, stage, change.timestamp);
            }
        }

        timestamps
    }
}

/// Apply a stage's first/last arrival policy to its timestamp slot.
fn record_arrival(timestamps: &mut StageTimestamps, stage: WorkflowStage, at: DateTime<Utc>) {
    let slot = match stage {
        WorkflowStage::ReadyForGrooming => &mut timestamps.ready_for_grooming,
        WorkflowStage::ReadyForDev => &mut timestamps.ready_for_dev,
        WorkflowStage::InProgress => &mut timestamps.in_progress,
        WorkflowStage::InReview => &mut timestamps.in_review,
        WorkflowStage::InQa => &mut timestamps.in_qa,
        WorkflowStage::ReadyForRelease => &mut timestamps.ready_for_release,
        WorkflowStage::Done => &mut timestamps.done,
        // Blocked has no timestamp slot; it is counted, not dated
        WorkflowStage::Blocked => return,
    };

    match stage.arrival_policy() {
        ArrivalPolicy::First => {
            if slot.is_none() {
                *slot = Some(at);
            }
        }
        ArrivalPolicy::Last => *slot = Some(at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawStatusChange;
    use chrono::TimeZone;

    fn ts(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
    }

    fn issue_with_history(changes: Vec<RawStatusChange>) -> RawIssue {
        let mut issue = RawIssue::new(
            "PROJ-1".to_string(),
            "Story".to_string(),
            "PROJ".to_string(),
            ts(1, 0),
        );
        issue.status_changes = changes;
        issue
    }

    #[test]
    fn test_opened_comes_from_created_at() {
        let classifier = StageClassifier::default();
        let extractor = TimestampExtractor::new(&classifier);
        let issue = issue_with_history(vec![]);

        let timestamps = extractor.extract(&issue);
        assert_eq!(timestamps.opened, Some(ts(1, 0)));
        assert!(timestamps.done.is_none());
    }

    #[test]
    fn test_first_entry_stages_keep_first_occurrence() {
        let classifier = StageClassifier::default();
        let extractor = TimestampExtractor::new(&classifier);
        let issue = issue_with_history(vec![
            RawStatusChange::status(None, "In Progress", ts(2, 9)),
            RawStatusChange::status(Some("In Progress"), "In Review", ts(3, 9)),
            // rework loop re-enters In Progress
            RawStatusChange::status(Some("In Review"), "In Progress", ts(4, 9)),
        ]);

        let timestamps = extractor.extract(&issue);
        assert_eq!(timestamps.in_progress, Some(ts(2, 9)));
        assert_eq!(timestamps.in_review, Some(ts(3, 9)));
    }

    #[test]
    fn test_last_entry_stages_take_latest_occurrence() {
        let classifier = StageClassifier::default();
        let extractor = TimestampExtractor::new(&classifier);
        let issue = issue_with_history(vec![
            RawStatusChange::status(None, "In QA", ts(2, 0)),
            RawStatusChange::status(Some("In QA"), "In Progress", ts(3, 0)),
            RawStatusChange::status(Some("In Progress"), "In QA", ts(4, 0)),
            RawStatusChange::status(Some("In QA"), "Done", ts(5, 0)),
        ]);

        let timestamps = extractor.extract(&issue);
        assert_eq!(timestamps.in_qa, Some(ts(4, 0)));
        assert_eq!(timestamps.done, Some(ts(5, 0)));
    }

    #[test]
    fn test_shared_status_fills_both_slots() {
        let classifier = StageClassifier::default();
        let extractor = TimestampExtractor::new(&classifier);
        let issue = issue_with_history(vec![RawStatusChange::status(
            Some("In QA"),
            "Ready for Release",
            ts(6, 0),
        )]);

        let timestamps = extractor.extract(&issue);
        assert_eq!(timestamps.ready_for_release, Some(ts(6, 0)));
        assert_eq!(timestamps.done, Some(ts(6, 0)));
    }

    #[test]
    fn test_unrecognized_and_non_status_changes_are_skipped() {
        let classifier = StageClassifier::default();
        let extractor = TimestampExtractor::new(&classifier);
        let mut assignee_change = RawStatusChange::status(None, "In Progress", ts(2, 0));
        assignee_change.field_name = "assignee".to_string();

        let issue = issue_with_history(vec![
            assignee_change,
            RawStatusChange::status(None, "Some Custom Column", ts(3, 0)),
        ]);

        let timestamps = extractor.extract(&issue);
        assert!(timestamps.in_progress.is_none());
    }

    #[test]
    fn test_unsorted_history_is_sorted_before_extraction() {
        let classifier = StageClassifier::default();
        let extractor = TimestampExtractor::new(&classifier);
        let issue = issue_with_history(vec![
            RawStatusChange::status(None, "Done", ts(5, 0)),
            RawStatusChange::status(None, "In Progress", ts(2, 0)),
            RawStatusChange::status(None, "In Progress", ts(4, 0)),
        ]);

        let timestamps = extractor.extract(&issue);
        // first In Progress after sorting, not first in record order
        assert_eq!(timestamps.in_progress, Some(ts(2, 0)));
        assert_eq!(timestamps.done, Some(ts(5, 0)));
    }
}
