//! Error types for analytics operations

use crate::error::AppError;

/// Result type for analytics operations
pub type AnalyticsResult<T> = std::result::Result<T, AnalyticsError>;

/// Errors that can occur in analytics operations.
///
/// Metric computation itself never fails: malformed history degrades to null
/// fields and empty sample sets degrade to zero-count results. These variants
/// cover engine-level misuse only.
#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    /// Invalid date range
    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    /// Report generation failed
    #[error("Report generation failed: {0}")]
    ReportGenerationFailed(String),
}

impl From<AnalyticsError> for AppError {
    fn from(err: AnalyticsError) -> Self {
        match err {
            AnalyticsError::InvalidDateRange(msg) => AppError::Validation(msg),
            AnalyticsError::ReportGenerationFailed(_) => AppError::Internal(err.to_string()),
        }
    }
}
