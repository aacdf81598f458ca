//! Stage re-entry and blocker counting

use crate::models::RawStatusChange;
use crate::workflow::stage::{StageClassifier, WorkflowStage};

/// Rework and blockage counters for one issue.
///
/// Review and QA churn count every transition into the stage, the first entry
/// included: a story that passes review once records `review_churn == 1`.
/// "Zero churn" therefore means the stage was never entered at all, which is
/// what the first-time-through metric keys on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChurnCounts {
    /// Transitions into a Blocked status
    pub blockers: u32,

    /// Transitions into In Review
    pub review_churn: u32,

    /// Transitions into QA
    pub qa_churn: u32,
}

impl ChurnCounts {
    /// Count churn and blockers over a sorted status history.
    ///
    /// Single pass; only the destination of each transition matters.
    pub fn from_history(changes: &[RawStatusChange], classifier: &StageClassifier) -> Self {
        let mut counts = Self::default();

        for change in changes {
            if !change.is_status_change() {
                continue;
            }
            for stage in classifier.classify(&change.to_value) {
                match stage {
                    WorkflowStage::Blocked => counts.blockers += 1,
                    WorkflowStage::InReview => counts.review_churn += 1,
                    WorkflowStage::InQa => counts.qa_churn += 1,
                    _ => {}
                }
            }
        }

        counts
    }
}
