//! Report engine over an in-memory issue snapshot
//!
//! Mirrors the request lifecycle the API layer expects: the persistence layer
//! pushes an issue snapshot in, the engine derives per-issue metrics in
//! parallel, aggregates per report type, and caches report payloads for a
//! short TTL. Memoization is purely a performance optimization; every report
//! is a pure function of the snapshot and the request.

use crate::analytics::defects::{defect_resolution_by_priority, is_defect_type};
use crate::analytics::error::{AnalyticsError, AnalyticsResult};
use crate::analytics::flow::StageVariability;
use crate::analytics::reports::{
    DefectResolutionReport, FlowSummaryReport, IssueTableRow, Report, ReportRequest, ReportType,
    StageVariabilityReport,
};
use crate::filters::facet_counts;
use crate::models::{IssueAnalysis, RawIssue};
use crate::workflow::{analyze_issues, StageClassifier, StageVocabulary};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Configuration for the flow analytics engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Stage vocabulary the classifier is built from
    pub vocabulary: StageVocabulary,

    /// Cache TTL for generated reports (seconds)
    pub cache_ttl: u64,

    /// Minimum paired samples before correlations are reported
    pub min_correlation_samples: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            vocabulary: StageVocabulary::default(),
            cache_ttl: 300,
            min_correlation_samples: 2,
        }
    }
}

/// Flow analytics report engine.
pub struct FlowAnalyticsEngine {
    config: AnalyticsConfig,
    classifier: StageClassifier,
    issue_cache: Arc<RwLock<Vec<RawIssue>>>,
    report_cache: Arc<RwLock<HashMap<String, (Report, DateTime<Utc>)>>>,
}

impl FlowAnalyticsEngine {
    /// Create an engine from configuration
    pub fn new(config: AnalyticsConfig) -> Self {
        let classifier = StageClassifier::new(config.vocabulary.clone());
        Self {
            config,
            classifier,
            issue_cache: Arc::new(RwLock::new(Vec::new())),
            report_cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create with the default vocabulary and cache settings
    pub fn with_defaults() -> Self {
        Self::new(AnalyticsConfig::default())
    }

    /// Replace the issue snapshot and drop stale reports.
    pub async fn update_issue_cache(&self, issues: Vec<RawIssue>) {
        {
            let mut cache = self.issue_cache.write().await;
            *cache = issues;
        }
        self.clear_report_cache().await;
    }

    /// Generate a report for the request, serving from cache when fresh.
    ///
    /// A filter with an inverted date range is rejected up front rather than
    /// silently matching nothing.
    pub async fn generate_report(&self, request: &ReportRequest) -> AnalyticsResult<Report> {
        validate_filters(&request.filters)?;
        let cache_key = self.cache_key(request)?;

        {
            let cache = self.report_cache.read().await;
            if let Some((report, cached_at)) = cache.get(&cache_key) {
                let age = Utc::now().signed_duration_since(*cached_at).num_seconds();
                if age >= 0 && (age as u64) < self.config.cache_ttl {
                    tracing::debug!(report_type = %request.report_type, "serving cached report");
                    return Ok(report.clone());
                }
            }
        }

        let issues = self.issue_cache.read().await;
        tracing::info!(
            report_type = %request.report_type,
            issues = issues.len(),
            "generating report"
        );

        let report = match request.report_type {
            ReportType::IssueTable => self.issue_table_report(&issues, request)?,
            ReportType::FlowSummary => self.flow_summary_report(&issues, request)?,
            ReportType::StageVariability => self.stage_variability_report(&issues, request)?,
            ReportType::DefectResolution => self.defect_resolution_report(&issues, request)?,
            ReportType::FilterFacets => self.filter_facets_report(&issues, request)?,
        };
        drop(issues);

        {
            let mut cache = self.report_cache.write().await;
            cache.insert(cache_key, (report.clone(), Utc::now()));
        }

        Ok(report)
    }

    /// Drop all cached reports.
    pub async fn clear_report_cache(&self) {
        let mut cache = self.report_cache.write().await;
        cache.clear();
    }

    /// Number of cached reports.
    pub async fn cached_report_count(&self) -> usize {
        self.report_cache.read().await.len()
    }

    fn cache_key(&self, request: &ReportRequest) -> AnalyticsResult<String> {
        let filters = serde_json::to_string(&request.filters)
            .map_err(|e| AnalyticsError::ReportGenerationFailed(e.to_string()))?;
        Ok(format!("{}-{}", request.report_type, filters))
    }

    /// Filter the snapshot and derive per-issue metrics for it.
    fn analyze_filtered(&self, issues: &[RawIssue], request: &ReportRequest) -> Vec<IssueAnalysis> {
        let filtered: Vec<RawIssue> = request
            .filters
            .apply(issues)
            .into_iter()
            .cloned()
            .collect();
        analyze_issues(&filtered, &self.classifier)
    }

    fn issue_table_report(
        &self,
        issues: &[RawIssue],
        request: &ReportRequest,
    ) -> AnalyticsResult<Report> {
        let analyses = self.analyze_filtered(issues, request);
        let rows: Vec<IssueTableRow> = analyses.iter().map(IssueTableRow::from_analysis).collect();

        let summary = format!("{} issues", rows.len());
        let data = serde_json::to_value(&rows)
            .map_err(|e| AnalyticsError::ReportGenerationFailed(e.to_string()))?;

        Ok(Report::new("Issue Metrics".to_string(), ReportType::IssueTable)
            .with_summary(summary)
            .with_data(data))
    }

    fn flow_summary_report(
        &self,
        issues: &[RawIssue],
        request: &ReportRequest,
    ) -> AnalyticsResult<Report> {
        let analyses = self.analyze_filtered(issues, request);
        let mut summary_report = FlowSummaryReport::from_analyses(&analyses);

        // each correlation is gated on its own pair count; below the floor it
        // renders as "insufficient data"
        let floor = self.config.min_correlation_samples;
        if summary_report.correlations.lead_sample_size < floor {
            summary_report.correlations.points_vs_lead_time = 0.0;
        }
        if summary_report.correlations.cycle_sample_size < floor {
            summary_report.correlations.points_vs_cycle_time = 0.0;
        }

        let summary = format!(
            "{} issues, {} resolved. Flow efficiency {:.1}%, first-time-through {:.1}%",
            summary_report.total_issues,
            summary_report.resolved_issues,
            summary_report.flow_efficiency.efficiency_pct,
            summary_report.first_time_through.rate_pct,
        );
        let data = serde_json::to_value(&summary_report)
            .map_err(|e| AnalyticsError::ReportGenerationFailed(e.to_string()))?;

        Ok(Report::new("Flow Summary".to_string(), ReportType::FlowSummary)
            .with_summary(summary)
            .with_data(data))
    }

    fn stage_variability_report(
        &self,
        issues: &[RawIssue],
        request: &ReportRequest,
    ) -> AnalyticsResult<Report> {
        let analyses = self.analyze_filtered(issues, request);
        let report = StageVariabilityReport {
            stages: StageVariability::calculate(&analyses),
            resolved_issues: analyses.iter().filter(|a| a.is_resolved()).count(),
        };

        let summary = format!(
            "Stage variability over {} resolved issues",
            report.resolved_issues
        );
        let data = serde_json::to_value(&report)
            .map_err(|e| AnalyticsError::ReportGenerationFailed(e.to_string()))?;

        Ok(
            Report::new("Stage Variability".to_string(), ReportType::StageVariability)
                .with_summary(summary)
                .with_data(data),
        )
    }

    fn defect_resolution_report(
        &self,
        issues: &[RawIssue],
        request: &ReportRequest,
    ) -> AnalyticsResult<Report> {
        let analyses = self.analyze_filtered(issues, request);
        let groups = defect_resolution_by_priority(&analyses);
        let defect_count = analyses
            .iter()
            .filter(|a| a.is_resolved() && is_defect_type(&a.issue_type))
            .count();

        let report = DefectResolutionReport {
            groups,
            defect_count,
        };
        let summary = format!(
            "{} resolved defects across {} priority groups",
            report.defect_count,
            report.groups.len()
        );
        let data = serde_json::to_value(&report)
            .map_err(|e| AnalyticsError::ReportGenerationFailed(e.to_string()))?;

        Ok(
            Report::new("Defect Resolution".to_string(), ReportType::DefectResolution)
                .with_summary(summary)
                .with_data(data),
        )
    }

    fn filter_facets_report(
        &self,
        issues: &[RawIssue],
        request: &ReportRequest,
    ) -> AnalyticsResult<Report> {
        // facet counts run over the whole snapshot: each facet ignores its own
        // dimension, so pre-filtering would double-apply the spec
        let counts = facet_counts(issues, &request.filters);

        let summary = format!("Facet counts over {} issues", issues.len());
        let data = serde_json::to_value(&counts)
            .map_err(|e| AnalyticsError::ReportGenerationFailed(e.to_string()))?;

        Ok(Report::new("Filter Facets".to_string(), ReportType::FilterFacets)
            .with_summary(summary)
            .with_data(data))
    }
}

fn validate_filters(filters: &crate::filters::FilterSpec) -> AnalyticsResult<()> {
    let ranges = [
        ("created", &filters.created_range),
        ("resolved", &filters.resolved_range),
    ];
    for (name, range) in ranges {
        if let Some(range) = range {
            if !range.is_valid() {
                return Err(AnalyticsError::InvalidDateRange(format!(
                    "{name} range starts after it ends"
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{DateRange, FilterSpec};
    use crate::models::RawStatusChange;
    use chrono::TimeZone;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, d, 9, 0, 0).unwrap()
    }

    fn pointed_issue(key: &str, points: f64, done: u32, with_progress: bool) -> RawIssue {
        let mut issue = RawIssue::new(
            key.to_string(),
            "Story".to_string(),
            "PROJ".to_string(),
            day(1),
        );
        if with_progress {
            issue
                .status_changes
                .push(RawStatusChange::status(None, "In Progress", day(2)));
        }
        issue
            .status_changes
            .push(RawStatusChange::status(Some("In Progress"), "Done", day(done)));
        issue.story_points = Some(points);
        issue.resolved_at = Some(day(done));
        issue
    }

    #[test]
    fn test_analytics_config_default() {
        let config = AnalyticsConfig::default();
        assert_eq!(config.cache_ttl, 300);
        assert_eq!(config.min_correlation_samples, 2);
    }

    #[tokio::test]
    async fn test_engine_starts_with_empty_caches() {
        let engine = FlowAnalyticsEngine::with_defaults();
        assert_eq!(engine.cached_report_count().await, 0);

        let report = engine
            .generate_report(&ReportRequest::new(ReportType::FlowSummary))
            .await
            .unwrap();
        assert_eq!(report.report_type, ReportType::FlowSummary);
        assert_eq!(engine.cached_report_count().await, 1);
    }

    #[tokio::test]
    async fn test_snapshot_update_invalidates_reports() {
        let engine = FlowAnalyticsEngine::with_defaults();
        engine
            .generate_report(&ReportRequest::new(ReportType::IssueTable))
            .await
            .unwrap();
        assert_eq!(engine.cached_report_count().await, 1);

        engine.update_issue_cache(Vec::new()).await;
        assert_eq!(engine.cached_report_count().await, 0);
    }

    #[tokio::test]
    async fn test_inverted_date_range_rejected() {
        let engine = FlowAnalyticsEngine::with_defaults();
        let request = ReportRequest::new(ReportType::IssueTable).with_filters(FilterSpec {
            created_range: Some(DateRange::new(Some(day(10)), Some(day(2)))),
            ..Default::default()
        });

        let err = engine.generate_report(&request).await.unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidDateRange(_)));
        assert_eq!(engine.cached_report_count().await, 0);
    }

    #[tokio::test]
    async fn test_correlations_gated_on_their_own_pair_counts() {
        let config = AnalyticsConfig {
            min_correlation_samples: 3,
            ..Default::default()
        };
        let engine = FlowAnalyticsEngine::new(config);
        // three points/lead pairs, but only two points/cycle pairs
        engine
            .update_issue_cache(vec![
                pointed_issue("PROJ-1", 1.0, 3, true),
                pointed_issue("PROJ-2", 2.0, 5, true),
                pointed_issue("PROJ-3", 3.0, 7, false),
            ])
            .await;

        let report = engine
            .generate_report(&ReportRequest::new(ReportType::FlowSummary))
            .await
            .unwrap();
        let summary: FlowSummaryReport = serde_json::from_value(report.data).unwrap();

        assert_eq!(summary.correlations.lead_sample_size, 3);
        assert_eq!(summary.correlations.cycle_sample_size, 2);
        assert!((summary.correlations.points_vs_lead_time - 1.0).abs() < 1e-9);
        assert_eq!(summary.correlations.points_vs_cycle_time, 0.0);
    }
}
