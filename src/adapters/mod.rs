//! Import-record normalization
//!
//! Tracker exports are not shape-stable: depending on the export path, the
//! issue type lives at `fields.issuetype.name`, `issue_type`, `issueType` or
//! plain `type`, and status-change entries mix snake_case and camelCase. This
//! adapter tries an ordered list of extraction strategies per field (nested
//! structured field, then snake_case, then camelCase, then the generic field,
//! then a fallback sentinel) and emits the canonical [`RawIssue`] shape the
//! engine consumes. One malformed record is skipped with a warning; it never
//! aborts the batch.

use crate::error::AppError;
use crate::models::{RawIssue, RawStatusChange};
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

/// Sentinel used when no strategy yields an issue type.
const UNKNOWN_TYPE: &str = "Unknown";

/// Normalizes heterogeneous export records into [`RawIssue`] values.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportAdapter;

impl ImportAdapter {
    pub fn new() -> Self {
        Self
    }

    /// Normalize a batch of export records.
    ///
    /// Records that cannot be normalized are skipped and logged; the rest of
    /// the batch is unaffected.
    pub fn normalize_batch(&self, records: &[Value]) -> Vec<RawIssue> {
        records
            .iter()
            .filter_map(|record| match self.normalize_issue(record) {
                Some(issue) => Some(issue),
                None => {
                    tracing::warn!(
                        key = %field_str(record, &["key"]).unwrap_or_default(),
                        "skipping malformed import record"
                    );
                    None
                }
            })
            .collect()
    }

    /// Normalize one export record. `None` when required fields are missing.
    pub fn normalize_issue(&self, record: &Value) -> Option<RawIssue> {
        let key = field_str(record, &["key", "issue_key", "issueKey"])?;
        let created_at = field_instant(record, &["created_at", "createdAt", "created"])?;

        let issue_type = extract_issue_type(record);
        let project_key = field_str(record, &["project_key", "projectKey", "project"])
            .unwrap_or_else(|| key.split('-').next().unwrap_or("").to_string());

        let mut issue = RawIssue::new(key, issue_type, project_key, created_at);
        if let Some(id) = field_str(record, &["id"]).and_then(|v| Uuid::parse_str(&v).ok()) {
            issue.id = id;
        }
        issue.priority = extract_priority(record);
        issue.sprint_name = field_str(record, &["sprint_name", "sprintName", "sprint"]);
        issue.story_points = field_f64(record, &["story_points", "storyPoints", "points"]);
        issue.resolved_at = field_instant(record, &["resolved_at", "resolvedAt", "resolutiondate"]);
        issue.status_changes = extract_status_changes(record);

        match issue.validate() {
            Ok(()) => Some(issue),
            Err(errors) => {
                let err = AppError::from(errors);
                tracing::warn!(key = %issue.key, error = %err, "import record failed validation");
                None
            }
        }
    }
}

/// Issue type extraction, in documented priority order:
/// nested `fields.issuetype.name` > snake_case > camelCase > generic `type` >
/// fallback sentinel.
fn extract_issue_type(record: &Value) -> String {
    record
        .pointer("/fields/issuetype/name")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| field_str(record, &["issue_type"]))
        .or_else(|| field_str(record, &["issueType"]))
        .or_else(|| field_str(record, &["type"]))
        .unwrap_or_else(|| UNKNOWN_TYPE.to_string())
}

fn extract_priority(record: &Value) -> Option<String> {
    record
        .pointer("/fields/priority/name")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| field_str(record, &["priority"]))
}

/// Status-change entries from `status_changes`/`statusChanges`/`changelog`.
///
/// Entries missing a destination status or a parseable timestamp are skipped
/// individually.
fn extract_status_changes(record: &Value) -> Vec<RawStatusChange> {
    let entries = ["status_changes", "statusChanges", "changelog"]
        .iter()
        .find_map(|name| record.get(*name).and_then(Value::as_array));

    let Some(entries) = entries else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| {
            let to_value = field_str(entry, &["to_value", "toValue", "to", "toString"])?;
            let timestamp = field_instant(entry, &["timestamp", "created", "createdAt"])?;
            Some(RawStatusChange {
                field_name: field_str(entry, &["field_name", "fieldName", "field"])
                    .unwrap_or_else(|| "status".to_string()),
                from_value: field_str(entry, &["from_value", "fromValue", "from", "fromString"]),
                to_value,
                timestamp,
            })
        })
        .collect()
}

/// First present string field among the candidate names.
fn field_str(record: &Value, names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| record.get(*name).and_then(Value::as_str))
        .map(str::to_string)
}

fn field_f64(record: &Value, names: &[&str]) -> Option<f64> {
    names.iter().find_map(|name| record.get(*name).and_then(Value::as_f64))
}

fn field_instant(record: &Value, names: &[&str]) -> Option<DateTime<Utc>> {
    field_str(record, names).and_then(|raw| {
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    })
}
