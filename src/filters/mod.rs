//! Declarative issue filtering and per-facet candidate counts
//!
//! A [`FilterSpec`] is a set of inclusion lists and date ranges applied
//! conjunctively. An empty inclusion list on a dimension means "no restriction
//! on that dimension", not "exclude everything" — statuses included, by
//! convention. Facet counting answers "how many issues have this option" for
//! the sidebar: each value's count holds its own dimension unconstrained while
//! applying every other active dimension.

mod spec;

pub use spec::{DateRange, FilterDimension, FilterSpec, ResolutionStatus, StoryPointFilter};

use crate::models::RawIssue;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-facet candidate counts for sidebar rendering.
///
/// Keys are the raw facet values as the UI displays them; story points use the
/// numeric text or `"none"` for unestimated issues, statuses use
/// `"resolved"`/`"unresolved"`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FacetCounts {
    pub issue_types: HashMap<String, usize>,
    pub sprints: HashMap<String, usize>,
    pub story_points: HashMap<String, usize>,
    pub statuses: HashMap<String, usize>,
    pub project_keys: HashMap<String, usize>,
    pub priorities: HashMap<String, usize>,
}

/// Compute per-facet counts over a collection of issues.
///
/// For each dimension, an issue contributes to its value's bucket when it
/// matches every OTHER active dimension of the spec; the bucketed dimension
/// itself is ignored entirely. Toggling one value of a dimension therefore
/// never changes the counts reported for the other values of that same
/// dimension. O(dimensions × issues); candidate values are drawn from the
/// collection itself.
pub fn facet_counts(issues: &[RawIssue], spec: &FilterSpec) -> FacetCounts {
    let mut counts = FacetCounts::default();

    for issue in issues {
        if spec.matches_except(issue, FilterDimension::IssueType) {
            *counts
                .issue_types
                .entry(issue.issue_type.clone())
                .or_insert(0) += 1;
        }

        if spec.matches_except(issue, FilterDimension::Sprint) {
            if let Some(sprint) = &issue.sprint_name {
                *counts.sprints.entry(sprint.clone()).or_insert(0) += 1;
            }
        }

        if spec.matches_except(issue, FilterDimension::StoryPoints) {
            *counts
                .story_points
                .entry(story_point_key(issue.story_points))
                .or_insert(0) += 1;
        }

        if spec.matches_except(issue, FilterDimension::Status) {
            let status = if issue.is_resolved() {
                ResolutionStatus::Resolved
            } else {
                ResolutionStatus::Unresolved
            };
            *counts.statuses.entry(status.to_string()).or_insert(0) += 1;
        }

        if spec.matches_except(issue, FilterDimension::Project) {
            *counts
                .project_keys
                .entry(issue.project_key.clone())
                .or_insert(0) += 1;
        }

        if spec.matches_except(issue, FilterDimension::Priority) {
            if let Some(priority) = &issue.priority {
                *counts.priorities.entry(priority.clone()).or_insert(0) += 1;
            }
        }
    }

    counts
}

/// Facet key for a story point value (`"none"` for unestimated issues).
pub fn story_point_key(points: Option<f64>) -> String {
    match points {
        None => "none".to_string(),
        Some(p) if p.fract() == 0.0 => format!("{}", p as i64),
        Some(p) => format!("{}", p),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn issue(key: &str, issue_type: &str, sprint: Option<&str>, points: Option<f64>, resolved: bool) -> RawIssue {
        let created = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let mut issue = RawIssue::new(
            key.to_string(),
            issue_type.to_string(),
            "PROJ".to_string(),
            created,
        );
        issue.sprint_name = sprint.map(str::to_string);
        issue.story_points = points;
        if resolved {
            issue.resolved_at = Some(created + chrono::Duration::days(3));
        }
        issue
    }

    #[test]
    fn test_facet_counts_ignore_own_dimension() {
        let issues = vec![
            issue("A-1", "Task", None, Some(3.0), true),
            issue("A-2", "Bug", None, Some(5.0), true),
            issue("A-3", "Bug", None, None, false),
        ];

        // selecting Task must not change the counts reported for Bug
        let spec = FilterSpec {
            issue_types: vec!["Task".to_string()],
            ..Default::default()
        };
        let counts = facet_counts(&issues, &spec);
        assert_eq!(counts.issue_types.get("Bug"), Some(&2));
        assert_eq!(counts.issue_types.get("Task"), Some(&1));

        // other dimensions do apply the issue-type filter
        assert_eq!(counts.story_points.get("3"), Some(&1));
        assert_eq!(counts.story_points.get("5"), None);
    }

    #[test]
    fn test_facet_counts_with_empty_spec_count_everything() {
        let issues = vec![
            issue("A-1", "Task", Some("Sprint 1"), Some(3.0), true),
            issue("A-2", "Bug", Some("Sprint 1"), None, false),
        ];

        let counts = facet_counts(&issues, &FilterSpec::default());
        assert_eq!(counts.sprints.get("Sprint 1"), Some(&2));
        assert_eq!(counts.story_points.get("none"), Some(&1));
        assert_eq!(counts.statuses.get("resolved"), Some(&1));
        assert_eq!(counts.statuses.get("unresolved"), Some(&1));
        assert_eq!(counts.project_keys.get("PROJ"), Some(&2));
    }

    #[test]
    fn test_story_point_key_formatting() {
        assert_eq!(story_point_key(None), "none");
        assert_eq!(story_point_key(Some(3.0)), "3");
        assert_eq!(story_point_key(Some(0.5)), "0.5");
    }
}
