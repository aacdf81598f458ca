//! Aggregate analytics over derived issue metrics
//!
//! This module turns a collection of per-issue metric records into the
//! statistical summaries and flow ratios the reporting UI renders.
//!
//! # Components
//!
//! - **Statistics**: [`SummaryStats`] (median/mean/min/max/std-dev/count) and
//!   Pearson [`pearson_correlation`], with defined zero results for empty or
//!   undersized samples
//! - **Flow calculators**: flow efficiency, first-time-through rate, stage
//!   skips, blocked-time impact, per-stage variability
//! - **Defect resolution**: resolution-time summaries grouped by priority
//! - **Report engine**: [`FlowAnalyticsEngine`] — snapshot + TTL'd report
//!   cache over the pure calculators
//!
//! # Example
//!
//! ```no_run
//! use issue_flow_analytics::analytics::{FlowAnalyticsEngine, ReportRequest, ReportType};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = FlowAnalyticsEngine::with_defaults();
//!     engine.update_issue_cache(Vec::new()).await;
//!
//!     let report = engine
//!         .generate_report(&ReportRequest::new(ReportType::FlowSummary))
//!         .await?;
//!     println!("{}", report.summary);
//!     Ok(())
//! }
//! ```

mod defects;
mod engine;
mod error;
mod flow;
mod reports;
mod statistics;

pub use defects::{defect_resolution_by_priority, is_defect_type, DefectResolutionGroup};
pub use engine::{AnalyticsConfig, FlowAnalyticsEngine};
pub use error::{AnalyticsError, AnalyticsResult};
pub use flow::{
    BlockedTimeImpact, CorrelationInsights, FirstTimeThrough, FlowEfficiency, StageSkips,
    StageVariability,
};
pub use reports::{
    DefectResolutionReport, FlowSummaryReport, IssueTableRow, Report, ReportRequest, ReportType,
    StageVariabilityReport,
};
pub use statistics::{pearson_correlation, SummaryStats};
