//! Statistical summaries over per-issue metric samples

use serde::{Deserialize, Serialize};

/// Aggregate statistics over a set of numeric samples.
///
/// All fields are zero when the sample set is empty; that is a defined
/// convention, not an error. Callers must check `count` before trusting
/// `median`/`mean` (the UI renders zero-count results as "--").
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub median: f64,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub std_dev: f64,
    pub count: usize,
}

impl SummaryStats {
    /// Compute summary statistics from raw samples.
    ///
    /// NaN values are filtered out first. Median of an even-length sorted
    /// sample is the average of the two middle elements. Standard deviation is
    /// the population form (divide by N, not N-1).
    pub fn from_samples(values: &[f64]) -> Self {
        let mut samples: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        if samples.is_empty() {
            return Self::default();
        }

        samples.sort_by(|a, b| a.partial_cmp(b).expect("NaN filtered above"));

        let count = samples.len();
        let mean = samples.iter().sum::<f64>() / count as f64;
        let median = if count % 2 == 0 {
            (samples[count / 2 - 1] + samples[count / 2]) / 2.0
        } else {
            samples[count / 2]
        };
        let variance = samples.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;

        Self {
            median,
            mean,
            min: samples[0],
            max: samples[count - 1],
            std_dev: variance.sqrt(),
            count,
        }
    }

    /// Compute summary statistics from optional samples, skipping the nulls.
    pub fn from_optional(values: &[Option<f64>]) -> Self {
        let present: Vec<f64> = values.iter().filter_map(|v| *v).collect();
        Self::from_samples(&present)
    }

    /// Copy with every statistic rounded to one decimal place, the precision
    /// the dashboard displays. `count` is untouched.
    pub fn rounded(&self) -> Self {
        let tenths = |v: f64| (v * 10.0).round() / 10.0;
        Self {
            median: tenths(self.median),
            mean: tenths(self.mean),
            min: tenths(self.min),
            max: tenths(self.max),
            std_dev: tenths(self.std_dev),
            count: self.count,
        }
    }

    /// Coefficient of variation as a percentage (0 when the mean is 0).
    pub fn coefficient_of_variation(&self) -> f64 {
        if self.mean == 0.0 {
            0.0
        } else {
            100.0 * self.std_dev / self.mean
        }
    }
}

/// Pearson correlation coefficient between two sample series.
///
/// Returns 0 unless both series have the same length and at least 2 points,
/// and 0 when either series has zero variance — never NaN, so the dashboard
/// can always render the value. Pairs with a NaN on either side are dropped
/// before the guard is applied.
pub fn pearson_correlation(xs: &[f64], ys: &[f64]) -> f64 {
    if xs.len() != ys.len() {
        return 0.0;
    }

    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys.iter())
        .filter(|(x, y)| !x.is_nan() && !y.is_nan())
        .map(|(x, y)| (*x, *y))
        .collect();

    if pairs.len() < 2 {
        return 0.0;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut numerator = 0.0;
    let mut sum_sq_x = 0.0;
    let mut sum_sq_y = 0.0;

    for (x, y) in &pairs {
        let x_diff = x - mean_x;
        let y_diff = y - mean_y;
        numerator += x_diff * y_diff;
        sum_sq_x += x_diff * x_diff;
        sum_sq_y += y_diff * y_diff;
    }

    let denominator = (sum_sq_x * sum_sq_y).sqrt();
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_samples_yield_all_zero() {
        let stats = SummaryStats::from_samples(&[]);
        assert_eq!(stats, SummaryStats::default());
        assert_eq!(stats.count, 0);
    }

    #[test]
    fn test_single_sample() {
        let stats = SummaryStats::from_samples(&[5.0]);
        assert_eq!(stats.median, 5.0);
        assert_eq!(stats.mean, 5.0);
        assert_eq!(stats.min, 5.0);
        assert_eq!(stats.max, 5.0);
        assert_eq!(stats.std_dev, 0.0);
        assert_eq!(stats.count, 1);
    }

    #[test]
    fn test_even_length_median_averages_middle_pair() {
        let stats = SummaryStats::from_samples(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(stats.median, 2.5);
        assert_eq!(stats.mean, 2.5);
    }

    #[test]
    fn test_population_std_dev() {
        // population variance of [2, 4, 4, 4, 5, 5, 7, 9] is 4
        let stats = SummaryStats::from_samples(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((stats.std_dev - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_nan_samples_filtered() {
        let stats = SummaryStats::from_samples(&[1.0, f64::NAN, 3.0]);
        assert_eq!(stats.count, 2);
        assert_eq!(stats.mean, 2.0);
    }

    #[test]
    fn test_from_optional_skips_nulls() {
        let stats = SummaryStats::from_optional(&[Some(2.0), None, Some(4.0), None]);
        assert_eq!(stats.count, 2);
        assert_eq!(stats.median, 3.0);
    }

    #[test]
    fn test_coefficient_of_variation_zero_mean() {
        assert_eq!(SummaryStats::default().coefficient_of_variation(), 0.0);
    }

    #[test]
    fn test_perfect_positive_correlation() {
        let r = pearson_correlation(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]);
        assert!((r - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_perfect_negative_correlation() {
        let r = pearson_correlation(&[1.0, 2.0, 3.0], &[6.0, 4.0, 2.0]);
        assert!((r + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_correlation_sample_size_guard() {
        assert_eq!(pearson_correlation(&[1.0], &[1.0]), 0.0);
        assert_eq!(pearson_correlation(&[], &[]), 0.0);
        assert_eq!(pearson_correlation(&[1.0, 2.0], &[1.0]), 0.0);
    }

    #[test]
    fn test_correlation_zero_variance_guard() {
        assert_eq!(pearson_correlation(&[3.0, 3.0, 3.0], &[1.0, 2.0, 3.0]), 0.0);
    }
}
