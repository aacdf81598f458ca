//! Flow and cycle-time metrics engine for issue-tracker analytics dashboards.
//!
//! The crate is the computational core of a reporting application: it consumes
//! normalized issue records with their status-change histories, derives
//! canonical workflow-stage timestamps and per-issue flow metrics, and
//! aggregates them into the statistical summaries, flow ratios and facet
//! counts the dashboard renders. Persistence, transport and UI live outside;
//! the engine exposes plain data contracts.
//!
//! # Pipeline
//!
//! ```text
//! raw status history ─▶ workflow::StageClassifier + TimestampExtractor
//!                    ─▶ StageTimestamps ─▶ StageDurations + ChurnCounts
//!                    ─▶ IssueMetrics per issue
//! filtered IssueMetrics collection ─▶ analytics::SummaryStats, flow ratios,
//!                                     defect groups, facet counts
//! ```
//!
//! Per-issue derivation is pure and runs in parallel; aggregation consumes the
//! materialized snapshot. Malformed history never fails a computation — it
//! degrades to null fields and zero-count results the UI renders as "--".

pub mod adapters;
pub mod analytics;
pub mod config;
pub mod error;
pub mod filters;
pub mod models;
pub mod workflow;

pub use error::{AppError, Result};
