//! Absolute-error statistics of one column pair.
use serde::{Deserialize, Serialize};

/// Which statistic a tolerance bound applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Statistic {
    #[default]
    Max,
    Mean,
    Median,
}

/// `{count, max, mean, median}` of `|a − b|` over the rows where both values are finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorStats {
    pub count: usize,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
}

impl ErrorStats {
    /// Statistics of `|a[i] − b[i]|`; `None` when no pair is finite on both sides.
    pub fn from_pairs(a: &[f64], b: &[f64]) -> Option<Self> {
        let diffs: Vec<f64> = a
            .iter()
            .zip(b)
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .map(|(x, y)| (x - y).abs())
            .collect();
        ErrorStats::from_errors(diffs)
    }

    /// Statistics of a list of absolute errors.
    pub fn from_errors(mut errors: Vec<f64>) -> Option<Self> {
        if errors.is_empty() {
            return None;
        }
        let count = errors.len();
        let mean = errors.iter().sum::<f64>() / count as f64;
        let max = errors.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(ErrorStats {
            count,
            max,
            mean,
            median: median(&mut errors),
        })
    }

    pub fn get(&self, statistic: Statistic) -> f64 {
        match statistic {
            Statistic::Max => self.max,
            Statistic::Mean => self.mean,
            Statistic::Median => self.median,
        }
    }
}

/// Median of a non-empty slice; the mean of the two middle values for even lengths.
pub fn median(values: &mut [f64]) -> f64 {
    values.sort_by(f64::total_cmp);
    let n = values.len();
    if n % 2 == 1 {
        values[n / 2]
    } else {
        0.5 * (values[n / 2 - 1] + values[n / 2])
    }
}

#[cfg(test)]
mod stats_test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_stats_skip_non_finite() {
        let a = [1.0, 2.0, f64::NAN, 4.0, 10.0];
        let b = [1.5, 2.0, 3.0, f64::INFINITY, 7.0];
        let stats = ErrorStats::from_pairs(&a, &b).unwrap();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.max, 3.0);
        assert_abs_diff_eq!(stats.mean, 3.5 / 3.0, epsilon = 1e-15);
        assert_eq!(stats.median, 0.5);
    }

    #[test]
    fn test_no_finite_pair() {
        assert!(ErrorStats::from_pairs(&[f64::NAN], &[1.0]).is_none());
        assert!(ErrorStats::from_pairs(&[], &[]).is_none());
    }

    #[test]
    fn test_median_even() {
        let mut v = vec![4.0, 1.0, 3.0, 2.0];
        assert_eq!(median(&mut v), 2.5);
    }
}
