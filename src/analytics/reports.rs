//! Report types and request/response envelopes

use crate::analytics::defects::DefectResolutionGroup;
use crate::analytics::flow::{
    BlockedTimeImpact, CorrelationInsights, FirstTimeThrough, FlowEfficiency, StageSkips,
    StageVariability,
};
use crate::analytics::statistics::SummaryStats;
use crate::filters::FilterSpec;
use crate::models::IssueAnalysis;
use crate::workflow::round_days;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;

/// Type of report to generate
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display)]
pub enum ReportType {
    /// Per-issue metrics joined with identity fields, for tabular display
    IssueTable,
    /// Aggregate flow ratios and duration summaries for the dashboard
    FlowSummary,
    /// Per-stage duration spread
    StageVariability,
    /// Defect resolution time grouped by priority
    DefectResolution,
    /// Per-facet candidate counts for the filter sidebar
    FilterFacets,
}

/// Request for generating a report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRequest {
    pub report_type: ReportType,
    pub filters: FilterSpec,
}

impl ReportRequest {
    pub fn new(report_type: ReportType) -> Self {
        Self {
            report_type,
            filters: FilterSpec::default(),
        }
    }

    pub fn with_filters(mut self, filters: FilterSpec) -> Self {
        self.filters = filters;
        self
    }
}

/// Report envelope handed to the API layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    pub title: String,
    pub report_type: ReportType,
    pub generated_at: DateTime<Utc>,
    pub summary: String,
    pub data: serde_json::Value,
}

impl Report {
    pub fn new(title: String, report_type: ReportType) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title,
            report_type,
            generated_at: Utc::now(),
            summary: String::new(),
            data: serde_json::Value::Null,
        }
    }

    pub fn with_summary(mut self, summary: String) -> Self {
        self.summary = summary;
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }
}

/// One row of the issue metrics table.
///
/// Durations are rounded to the single decimal the table displays; `None`
/// renders as "--".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueTableRow {
    pub key: String,
    pub issue_type: String,
    pub priority: Option<String>,
    pub sprint_name: Option<String>,
    pub story_points: Option<f64>,
    pub resolved: bool,
    pub lead_time: Option<f64>,
    pub cycle_time: Option<f64>,
    pub grooming_cycle_time: Option<f64>,
    pub dev_cycle_time: Option<f64>,
    pub qa_cycle_time: Option<f64>,
    pub blockers: u32,
    pub review_churn: u32,
    pub qa_churn: u32,
}

impl IssueTableRow {
    pub fn from_analysis(analysis: &IssueAnalysis) -> Self {
        let metrics = &analysis.metrics;
        Self {
            key: analysis.key.clone(),
            issue_type: analysis.issue_type.clone(),
            priority: analysis.priority.clone(),
            sprint_name: analysis.sprint_name.clone(),
            story_points: analysis.story_points,
            resolved: analysis.is_resolved(),
            lead_time: metrics.lead_time.map(round_days),
            cycle_time: metrics.cycle_time.map(round_days),
            grooming_cycle_time: metrics.grooming_cycle_time.map(round_days),
            dev_cycle_time: metrics.dev_cycle_time.map(round_days),
            qa_cycle_time: metrics.qa_cycle_time.map(round_days),
            blockers: metrics.blockers,
            review_churn: metrics.review_churn,
            qa_churn: metrics.qa_churn,
        }
    }
}

/// Aggregate dashboard payload for a filtered issue set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowSummaryReport {
    pub total_issues: usize,
    pub resolved_issues: usize,
    pub lead_time: SummaryStats,
    pub cycle_time: SummaryStats,
    pub flow_efficiency: FlowEfficiency,
    pub first_time_through: FirstTimeThrough,
    pub stage_skips: StageSkips,
    pub blocked_time_impact: BlockedTimeImpact,
    pub correlations: CorrelationInsights,
}

impl FlowSummaryReport {
    /// Build the full aggregate payload from the analyzed issue set.
    pub fn from_analyses(analyses: &[IssueAnalysis]) -> Self {
        let lead_samples: Vec<Option<f64>> =
            analyses.iter().map(|a| a.metrics.lead_time).collect();
        let cycle_samples: Vec<Option<f64>> =
            analyses.iter().map(|a| a.metrics.cycle_time).collect();

        Self {
            total_issues: analyses.len(),
            resolved_issues: analyses.iter().filter(|a| a.is_resolved()).count(),
            lead_time: SummaryStats::from_optional(&lead_samples).rounded(),
            cycle_time: SummaryStats::from_optional(&cycle_samples).rounded(),
            flow_efficiency: FlowEfficiency::calculate(analyses),
            first_time_through: FirstTimeThrough::calculate(analyses),
            stage_skips: StageSkips::calculate(analyses),
            blocked_time_impact: BlockedTimeImpact::calculate(analyses),
            correlations: CorrelationInsights::calculate(analyses),
        }
    }
}

/// Stage variability payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageVariabilityReport {
    pub stages: Vec<StageVariability>,
    pub resolved_issues: usize,
}

/// Defect resolution payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefectResolutionReport {
    pub groups: Vec<DefectResolutionGroup>,
    pub defect_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_creation() {
        let report = Report::new("Flow Summary".to_string(), ReportType::FlowSummary)
            .with_summary("3 issues".to_string());

        assert_eq!(report.report_type, ReportType::FlowSummary);
        assert_eq!(report.summary, "3 issues");
        assert!(report.data.is_null());
    }

    #[test]
    fn test_request_builder() {
        let request = ReportRequest::new(ReportType::IssueTable).with_filters(FilterSpec {
            issue_types: vec!["Bug".to_string()],
            ..Default::default()
        });

        assert_eq!(request.report_type, ReportType::IssueTable);
        assert_eq!(request.filters.issue_types, vec!["Bug".to_string()]);
    }
}
