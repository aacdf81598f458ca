use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// One recorded status transition for an issue.
///
/// Immutable historical fact imported from the tracker export. Ordering is by
/// `timestamp`; ties keep the original record order (stable sort).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawStatusChange {
    /// Changed field name ("status" for workflow transitions)
    pub field_name: String,

    /// Status before the transition, if recorded
    pub from_value: Option<String>,

    /// Status after the transition
    pub to_value: String,

    /// When the transition happened
    pub timestamp: DateTime<Utc>,
}

impl RawStatusChange {
    /// Create a status-field transition
    pub fn status(from: Option<&str>, to: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            field_name: "status".to_string(),
            from_value: from.map(str::to_string),
            to_value: to.to_string(),
            timestamp,
        }
    }

    /// Whether this record is a workflow status transition
    pub fn is_status_change(&self) -> bool {
        self.field_name.eq_ignore_ascii_case("status")
    }
}

/// An imported issue with its status-change history.
///
/// Read-only from the engine's perspective; produced by the import layer
/// (or the [`crate::adapters`] normalization adapter).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RawIssue {
    /// Unique identifier
    pub id: Uuid,

    /// Tracker key, unique within a tenant (e.g. "PROJ-123")
    #[validate(length(min = 1, max = 255))]
    pub key: String,

    /// Issue type as exported (Story, Bug, Task, ...)
    #[validate(length(min = 1, max = 255))]
    pub issue_type: String,

    /// Owning project key
    pub project_key: String,

    /// Priority label, if set (e.g. "P1")
    pub priority: Option<String>,

    /// Sprint the issue was delivered in, if any
    pub sprint_name: Option<String>,

    /// Story point estimate, if estimated
    pub story_points: Option<f64>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Resolution timestamp; `None` while the issue is open
    pub resolved_at: Option<DateTime<Utc>>,

    /// Status-change history, expected roughly time-ordered
    pub status_changes: Vec<RawStatusChange>,
}

impl RawIssue {
    /// Create an issue with an empty history
    pub fn new(key: String, issue_type: String, project_key: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            key,
            issue_type,
            project_key,
            priority: None,
            sprint_name: None,
            story_points: None,
            created_at,
            resolved_at: None,
            status_changes: Vec::new(),
        }
    }

    /// Whether the issue has been resolved
    pub fn is_resolved(&self) -> bool {
        self.resolved_at.is_some()
    }

    /// Days from creation to resolution, when resolved
    pub fn resolution_days(&self) -> Option<f64> {
        let resolved = self.resolved_at?;
        let ms = resolved.signed_duration_since(self.created_at).num_milliseconds();
        Some(ms as f64 / 86_400_000.0)
    }

    /// Status-change history sorted by timestamp.
    ///
    /// The sort is stable so same-instant transitions keep the order the
    /// export recorded them in.
    pub fn sorted_status_changes(&self) -> Vec<RawStatusChange> {
        let mut changes = self.status_changes.clone();
        changes.sort_by_key(|c| c.timestamp);
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_sorted_status_changes_is_stable() {
        let mut issue = RawIssue::new(
            "PROJ-1".to_string(),
            "Story".to_string(),
            "PROJ".to_string(),
            ts(0),
        );
        issue.status_changes = vec![
            RawStatusChange::status(None, "second", ts(2)),
            RawStatusChange::status(None, "first-a", ts(1)),
            RawStatusChange::status(None, "first-b", ts(1)),
        ];

        let sorted = issue.sorted_status_changes();
        assert_eq!(sorted[0].to_value, "first-a");
        assert_eq!(sorted[1].to_value, "first-b");
        assert_eq!(sorted[2].to_value, "second");
    }

    #[test]
    fn test_resolution_days() {
        let mut issue = RawIssue::new(
            "PROJ-2".to_string(),
            "Bug".to_string(),
            "PROJ".to_string(),
            ts(0),
        );
        assert!(issue.resolution_days().is_none());

        issue.resolved_at = Some(ts(12));
        assert!((issue.resolution_days().unwrap() - 0.5).abs() < 1e-9);
    }
}
