//! Defect resolution time grouped by priority

use crate::analytics::statistics::SummaryStats;
use crate::models::IssueAnalysis;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Issue types treated as defects (case-insensitive substring match).
const DEFECT_TYPE_FRAGMENTS: &[&str] = &["bug", "defect", "issue", "incident"];

/// Label used for defects without a priority.
const UNPRIORITIZED: &str = "None";

static P_PRIORITY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^p(\d+)$").expect("valid pattern"));

/// Resolution time summary for one priority group of defects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefectResolutionGroup {
    /// Priority label ("P1", "High", "None", ...)
    pub priority: String,

    /// Summary over (resolved_at − created_at) in days
    pub stats: SummaryStats,
}

/// Group resolved defects by priority and summarize their resolution times.
///
/// Groups are sorted priority-aware: labels matching `P<n>` sort numerically
/// ascending (P1 before P2, before P10); everything else sorts after the
/// P-labels, alphabetically.
pub fn defect_resolution_by_priority(analyses: &[IssueAnalysis]) -> Vec<DefectResolutionGroup> {
    let mut samples_by_priority: HashMap<String, Vec<f64>> = HashMap::new();

    for analysis in analyses {
        if !is_defect_type(&analysis.issue_type) {
            continue;
        }
        let Some(days) = analysis.resolution_days() else {
            continue;
        };
        let priority = analysis
            .priority
            .clone()
            .unwrap_or_else(|| UNPRIORITIZED.to_string());
        samples_by_priority.entry(priority).or_default().push(days);
    }

    let mut groups: Vec<DefectResolutionGroup> = samples_by_priority
        .into_iter()
        .map(|(priority, samples)| DefectResolutionGroup {
            priority,
            stats: SummaryStats::from_samples(&samples),
        })
        .collect();

    groups.sort_by(|a, b| compare_priorities(&a.priority, &b.priority));
    groups
}

/// Whether an issue type names a defect.
pub fn is_defect_type(issue_type: &str) -> bool {
    let lowered = issue_type.to_lowercase();
    DEFECT_TYPE_FRAGMENTS.iter().any(|f| lowered.contains(f))
}

/// Priority-aware label comparison: P-numbered first (numeric), rest alphabetical.
fn compare_priorities(a: &str, b: &str) -> Ordering {
    match (p_number(a), p_number(b)) {
        (Some(na), Some(nb)) => na.cmp(&nb),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

fn p_number(label: &str) -> Option<u32> {
    P_PRIORITY
        .captures(&label.to_lowercase())
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
