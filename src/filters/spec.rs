//! Filter specification and predicate evaluation

use crate::models::RawIssue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Resolution status derived from `resolved_at`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ResolutionStatus {
    Resolved,
    Unresolved,
}

/// One selectable story point option: a numeric estimate or the
/// "unestimated" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StoryPointFilter {
    #[serde(rename = "none")]
    Unestimated,
    #[serde(untagged)]
    Points(f64),
}

impl StoryPointFilter {
    fn matches(&self, points: Option<f64>) -> bool {
        match (self, points) {
            (StoryPointFilter::Unestimated, None) => true,
            (StoryPointFilter::Points(selected), Some(actual)) => *selected == actual,
            _ => false,
        }
    }
}

/// Inclusive date range. The end boundary is extended to 23:59:59.999 of its
/// calendar day so "to 2024-03-05" includes everything on the 5th.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    /// Whether an instant falls inside the range.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        if let Some(start) = self.start {
            if at < start {
                return false;
            }
        }
        if let Some(end) = self.effective_end() {
            if at > end {
                return false;
            }
        }
        true
    }

    /// Whether the range can contain anything: start must not fall after the
    /// (end-of-day extended) end boundary.
    pub fn is_valid(&self) -> bool {
        match (self.start, self.effective_end()) {
            (Some(start), Some(end)) => start <= end,
            _ => true,
        }
    }

    fn effective_end(&self) -> Option<DateTime<Utc>> {
        self.end.map(|end| {
            end.date_naive()
                .and_hms_milli_opt(23, 59, 59, 999)
                .expect("valid end-of-day time")
                .and_utc()
        })
    }

    fn is_active(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }
}

/// A filterable dimension of [`FilterSpec`], used by facet counting to hold
/// one dimension unconstrained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDimension {
    IssueType,
    Sprint,
    StoryPoints,
    Status,
    Project,
    Priority,
}

/// Declarative filter over an issue collection.
///
/// Dimensions combine conjunctively. An empty inclusion list imposes no
/// restriction on its dimension.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    #[serde(default)]
    pub issue_types: Vec<String>,

    #[serde(default)]
    pub sprints: Vec<String>,

    #[serde(default)]
    pub story_points: Vec<StoryPointFilter>,

    #[serde(default)]
    pub statuses: Vec<ResolutionStatus>,

    #[serde(default)]
    pub project_keys: Vec<String>,

    #[serde(default)]
    pub priorities: Vec<String>,

    #[serde(default)]
    pub created_range: Option<DateRange>,

    #[serde(default)]
    pub resolved_range: Option<DateRange>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an issue passes every active dimension.
    pub fn matches(&self, issue: &RawIssue) -> bool {
        FilterSpec::dimensions()
            .iter()
            .all(|dim| self.matches_dimension(issue, *dim))
            && self.matches_date_ranges(issue)
    }

    /// Whether an issue passes every active dimension except `ignored`.
    ///
    /// Date ranges always apply; they are not faceted.
    pub fn matches_except(&self, issue: &RawIssue, ignored: FilterDimension) -> bool {
        FilterSpec::dimensions()
            .iter()
            .filter(|dim| **dim != ignored)
            .all(|dim| self.matches_dimension(issue, *dim))
            && self.matches_date_ranges(issue)
    }

    /// Restrict a collection to the issues passing this spec.
    pub fn apply<'a>(&self, issues: &'a [RawIssue]) -> Vec<&'a RawIssue> {
        issues.iter().filter(|i| self.matches(i)).collect()
    }

    /// Whether any dimension or date range is active.
    pub fn is_empty(&self) -> bool {
        self.issue_types.is_empty()
            && self.sprints.is_empty()
            && self.story_points.is_empty()
            && self.statuses.is_empty()
            && self.project_keys.is_empty()
            && self.priorities.is_empty()
            && !self.created_range.map(|r| r.is_active()).unwrap_or(false)
            && !self.resolved_range.map(|r| r.is_active()).unwrap_or(false)
    }

    fn dimensions() -> &'static [FilterDimension] {
        &[
            FilterDimension::IssueType,
            FilterDimension::Sprint,
            FilterDimension::StoryPoints,
            FilterDimension::Status,
            FilterDimension::Project,
            FilterDimension::Priority,
        ]
    }

    fn matches_dimension(&self, issue: &RawIssue, dimension: FilterDimension) -> bool {
        match dimension {
            FilterDimension::IssueType => {
                self.issue_types.is_empty() || self.issue_types.contains(&issue.issue_type)
            }
            FilterDimension::Sprint => {
                self.sprints.is_empty()
                    || issue
                        .sprint_name
                        .as_ref()
                        .map(|s| self.sprints.contains(s))
                        .unwrap_or(false)
            }
            FilterDimension::StoryPoints => {
                self.story_points.is_empty()
                    || self
                        .story_points
                        .iter()
                        .any(|f| f.matches(issue.story_points))
            }
            FilterDimension::Status => {
                // explicit convention: empty statuses selection is unrestricted
                self.statuses.is_empty() || {
                    let status = if issue.is_resolved() {
                        ResolutionStatus::Resolved
                    } else {
                        ResolutionStatus::Unresolved
                    };
                    self.statuses.contains(&status)
                }
            }
            FilterDimension::Project => {
                self.project_keys.is_empty() || self.project_keys.contains(&issue.project_key)
            }
            FilterDimension::Priority => {
                self.priorities.is_empty()
                    || issue
                        .priority
                        .as_ref()
                        .map(|p| self.priorities.contains(p))
                        .unwrap_or(false)
            }
        }
    }

    fn matches_date_ranges(&self, issue: &RawIssue) -> bool {
        if let Some(range) = &self.created_range {
            if range.is_active() && !range.contains(issue.created_at) {
                return false;
            }
        }
        if let Some(range) = &self.resolved_range {
            if range.is_active() {
                match issue.resolved_at {
                    Some(resolved) if range.contains(resolved) => {}
                    _ => return false,
                }
            }
        }
        true
    }
}
