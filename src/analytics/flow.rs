//! Aggregate flow metric calculators
//!
//! Higher-level ratios over a filtered collection of issues' derived metrics.
//! Every calculator defines its zero-division case as zero so the dashboard
//! always has a renderable value.

use crate::analytics::statistics::SummaryStats;
use crate::models::IssueAnalysis;
use serde::{Deserialize, Serialize};

/// Ratio of active working time to total lead time, as a percentage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowEfficiency {
    /// 100 × Σ active time / Σ lead time
    pub efficiency_pct: f64,

    /// Summed grooming + dev + QA days across the sample
    pub total_active_days: f64,

    /// Summed lead time days across the sample
    pub total_lead_days: f64,

    /// Resolved issues with a positive lead time that entered the ratio
    pub sample_size: usize,
}

impl FlowEfficiency {
    /// Compute flow efficiency over resolved issues with positive lead time.
    ///
    /// Active time per issue is grooming + dev + QA cycle time with missing
    /// legs treated as zero. Zero total lead time yields 0, not NaN.
    pub fn calculate(analyses: &[IssueAnalysis]) -> Self {
        let mut total_active_days = 0.0;
        let mut total_lead_days = 0.0;
        let mut sample_size = 0;

        for analysis in analyses.iter().filter(|a| a.is_resolved()) {
            let lead = match analysis.metrics.lead_time {
                Some(lead) if lead > 0.0 => lead,
                _ => continue,
            };
            total_lead_days += lead;
            total_active_days += analysis.metrics.active_time();
            sample_size += 1;
        }

        let efficiency_pct = if total_lead_days > 0.0 {
            100.0 * total_active_days / total_lead_days
        } else {
            0.0
        };

        Self {
            efficiency_pct,
            total_active_days,
            total_lead_days,
            sample_size,
        }
    }
}

/// Fraction of resolved issues that never entered review or QA rework.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FirstTimeThrough {
    /// 100 × clean / resolved; 0 when there are no resolved issues
    pub rate_pct: f64,

    /// Resolved issues with zero review churn and zero QA churn
    pub clean_count: usize,

    /// Resolved issues in the sample
    pub resolved_count: usize,
}

impl FirstTimeThrough {
    pub fn calculate(analyses: &[IssueAnalysis]) -> Self {
        let resolved: Vec<&IssueAnalysis> = analyses.iter().filter(|a| a.is_resolved()).collect();
        let resolved_count = resolved.len();
        let clean_count = resolved
            .iter()
            .filter(|a| a.metrics.is_first_time_through())
            .count();

        // 0/0 is defined as 0, not NaN or 100
        let rate_pct = if resolved_count > 0 {
            100.0 * clean_count as f64 / resolved_count as f64
        } else {
            0.0
        };

        Self {
            rate_pct,
            clean_count,
            resolved_count,
        }
    }
}

/// Percentages of resolved issues that bypassed a process stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StageSkips {
    /// % of resolved issues with no grooming duration (null or zero)
    pub grooming_skip_pct: f64,

    /// % of resolved issues that never entered review
    pub review_skip_pct: f64,

    /// Resolved issues in the sample
    pub resolved_count: usize,
}

impl StageSkips {
    pub fn calculate(analyses: &[IssueAnalysis]) -> Self {
        let resolved: Vec<&IssueAnalysis> = analyses.iter().filter(|a| a.is_resolved()).collect();
        let resolved_count = resolved.len();
        if resolved_count == 0 {
            return Self::default();
        }

        let skipped_grooming = resolved
            .iter()
            .filter(|a| a.metrics.grooming_cycle_time.unwrap_or(0.0) == 0.0)
            .count();
        let skipped_review = resolved
            .iter()
            .filter(|a| a.metrics.review_churn == 0)
            .count();

        Self {
            grooming_skip_pct: percent_one_decimal(skipped_grooming, resolved_count),
            review_skip_pct: percent_one_decimal(skipped_review, resolved_count),
            resolved_count,
        }
    }
}

/// Estimated lead-time penalty of blocked issues.
///
/// The difference between the average lead time of issues with at least one
/// blocker and of issues with none, expressed as a percentage of the blocked
/// group's average lead time. Clamped to zero from below; all-zero when no
/// blocked issues exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockedTimeImpact {
    pub impact_pct: f64,
    pub blocked_avg_lead_days: f64,
    pub unblocked_avg_lead_days: f64,
    pub blocked_count: usize,
    pub unblocked_count: usize,
}

impl BlockedTimeImpact {
    pub fn calculate(analyses: &[IssueAnalysis]) -> Self {
        let mut blocked_leads = Vec::new();
        let mut unblocked_leads = Vec::new();

        for analysis in analyses.iter().filter(|a| a.is_resolved()) {
            if let Some(lead) = analysis.metrics.lead_time {
                if analysis.metrics.blockers > 0 {
                    blocked_leads.push(lead);
                } else {
                    unblocked_leads.push(lead);
                }
            }
        }

        if blocked_leads.is_empty() {
            return Self::default();
        }

        let blocked_avg = blocked_leads.iter().sum::<f64>() / blocked_leads.len() as f64;
        let unblocked_avg = if unblocked_leads.is_empty() {
            0.0
        } else {
            unblocked_leads.iter().sum::<f64>() / unblocked_leads.len() as f64
        };

        let impact_pct = if blocked_avg > 0.0 {
            (100.0 * (blocked_avg - unblocked_avg) / blocked_avg).max(0.0)
        } else {
            0.0
        };

        Self {
            impact_pct,
            blocked_avg_lead_days: blocked_avg,
            unblocked_avg_lead_days: unblocked_avg,
            blocked_count: blocked_leads.len(),
            unblocked_count: unblocked_leads.len(),
        }
    }
}

/// Duration spread for one named pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageVariability {
    /// Display name of the stage (Grooming, Development, QA)
    pub stage: String,

    /// Summary over the stage's positive durations among resolved issues
    pub stats: SummaryStats,

    /// 100 × std_dev / mean; 0 when the mean is 0
    pub coefficient_of_variation: f64,
}

impl StageVariability {
    /// Compute per-stage duration variability over resolved issues.
    ///
    /// Null and non-positive durations are excluded from each stage's sample.
    pub fn calculate(analyses: &[IssueAnalysis]) -> Vec<Self> {
        let resolved: Vec<&IssueAnalysis> = analyses.iter().filter(|a| a.is_resolved()).collect();

        let stages: [(&str, fn(&IssueAnalysis) -> Option<f64>); 3] = [
            ("Grooming", |a| a.metrics.grooming_cycle_time),
            ("Development", |a| a.metrics.dev_cycle_time),
            ("QA", |a| a.metrics.qa_cycle_time),
        ];

        stages
            .iter()
            .map(|(name, duration)| {
                let samples: Vec<f64> = resolved
                    .iter()
                    .filter_map(|a| duration(a))
                    .filter(|d| *d > 0.0)
                    .collect();
                let stats = SummaryStats::from_samples(&samples);
                StageVariability {
                    stage: name.to_string(),
                    coefficient_of_variation: stats.coefficient_of_variation(),
                    stats,
                }
            })
            .collect()
    }
}

/// Cross-metric Pearson correlations the dashboard surfaces.
///
/// The two correlations are computed over different pair sets (an issue can
/// carry a lead time but no cycle time), so each tracks its own sample count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrelationInsights {
    /// Story points vs lead time
    pub points_vs_lead_time: f64,

    /// Story points vs cycle time
    pub points_vs_cycle_time: f64,

    /// Issues contributing both a point estimate and a lead time
    pub lead_sample_size: usize,

    /// Issues contributing both a point estimate and a cycle time
    pub cycle_sample_size: usize,
}

impl CorrelationInsights {
    pub fn calculate(analyses: &[IssueAnalysis]) -> Self {
        let lead_pairs: Vec<(f64, f64)> = analyses
            .iter()
            .filter_map(|a| Some((a.story_points?, a.metrics.lead_time?)))
            .collect();
        let cycle_pairs: Vec<(f64, f64)> = analyses
            .iter()
            .filter_map(|a| Some((a.story_points?, a.metrics.cycle_time?)))
            .collect();

        let (lead_x, lead_y): (Vec<f64>, Vec<f64>) = lead_pairs.iter().copied().unzip();
        let (cycle_x, cycle_y): (Vec<f64>, Vec<f64>) = cycle_pairs.iter().copied().unzip();

        Self {
            points_vs_lead_time: super::statistics::pearson_correlation(&lead_x, &lead_y),
            points_vs_cycle_time: super::statistics::pearson_correlation(&cycle_x, &cycle_y),
            lead_sample_size: lead_pairs.len(),
            cycle_sample_size: cycle_pairs.len(),
        }
    }
}

/// Ratio as a percentage rounded to one decimal place.
fn percent_one_decimal(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (1000.0 * part as f64 / whole as f64).round() / 10.0
}
