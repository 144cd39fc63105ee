//! Descriptive statistics shared by the analytics engines.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::schema::{CanonicalRecord, NumericField};

// =============================================================================
// RUNNING STATISTICS
// =============================================================================
// Welford's online algorithm for mean and population variance in one pass.

#[derive(Debug, Clone, Copy)]
struct RunningStats {
    count: usize,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    fn new() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            m2: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    fn add(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        let delta2 = value - self.mean;
        self.m2 += delta * delta2;

        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
    }

    /// Population variance (divides by `n`).
    fn variance(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            (self.m2 / self.count as f64).max(0.0)
        }
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Round to a number of decimal places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Arithmetic mean; 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Population standard deviation; 0 for an empty slice.
pub fn population_std(values: &[f64]) -> f64 {
    let mut stats = RunningStats::new();
    for &v in values {
        stats.add(v);
    }
    stats.variance().sqrt()
}

/// Finite values in ascending order.
pub fn sorted_finite(values: impl IntoIterator<Item = f64>) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Linear-interpolated quantile of an ascending slice; 0 when empty.
///
/// The position is `(n - 1) * q`; the result interpolates between the two
/// neighbouring order statistics.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let pos = (sorted.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let base = pos.floor() as usize;
    let rest = pos - base as f64;
    match sorted.get(base + 1) {
        Some(next) => sorted[base] + rest * (next - sorted[base]),
        None => sorted[base],
    }
}

/// Most frequent value; ties go to the value that reached the top count first.
pub fn mode(values: &[f64]) -> Option<f64> {
    let mut counts: HashMap<u64, usize> = HashMap::new();
    let mut best: Option<(f64, usize)> = None;
    for &v in values {
        let count = counts.entry(v.to_bits()).or_insert(0);
        *count += 1;
        if best.is_none_or(|(_, top)| *count > top) {
            best = Some((v, *count));
        }
    }
    best.map(|(v, _)| v)
}

/// Percentage of `part` in `whole`; 0 when `whole` is 0.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

// =============================================================================
// SUMMARY
// =============================================================================

/// Descriptive statistics of one numeric sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    /// Population standard deviation.
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub iqr: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<f64>,
}

impl Summary {
    /// Summarize the finite values of a sample. An empty sample yields all zeros.
    pub fn from_values(values: &[f64]) -> Self {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return Self::default();
        }

        let mut running = RunningStats::new();
        for &v in &finite {
            running.add(v);
        }
        let sorted = sorted_finite(finite.iter().copied());
        let q1 = quantile(&sorted, 0.25);
        let q3 = quantile(&sorted, 0.75);

        Self {
            count: running.count,
            mean: running.mean,
            std: running.variance().sqrt(),
            min: running.min,
            max: running.max,
            q1,
            median: quantile(&sorted, 0.5),
            q3,
            iqr: q3 - q1,
            mode: mode(&finite),
        }
    }

    /// Summarize a numeric projection of a dataset.
    pub fn of_field(records: &[CanonicalRecord], field: NumericField) -> Self {
        let values: Vec<f64> = records.iter().map(|r| r.numeric(field)).collect();
        Self::from_values(&values)
    }

    /// Z-score of a value against this sample; 0 when the sample has no spread.
    pub fn z_score(&self, value: f64) -> f64 {
        if self.std == 0.0 {
            0.0
        } else {
            (value - self.mean) / self.std
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantile_interpolates() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&sorted, 0.0), 1.0);
        assert_eq!(quantile(&sorted, 0.5), 2.5);
        assert_eq!(quantile(&sorted, 0.25), 1.75);
        assert_eq!(quantile(&sorted, 1.0), 4.0);
        assert_eq!(quantile(&[], 0.5), 0.0);
        assert_eq!(quantile(&[7.0], 0.75), 7.0);
    }

    #[test]
    fn test_population_std() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((population_std(&values) - 2.0).abs() < 1e-12);
        assert_eq!(population_std(&[]), 0.0);
    }

    #[test]
    fn test_summary() {
        let summary = Summary::from_values(&[10.0, 10.0, 10.0, 10.0, 100.0, f64::NAN]);
        assert_eq!(summary.count, 5);
        assert_eq!(summary.mean, 28.0);
        assert_eq!(summary.median, 10.0);
        assert_eq!(summary.iqr, 0.0);
        assert_eq!(summary.mode, Some(10.0));
        assert_eq!(summary.min, 10.0);
        assert_eq!(summary.max, 100.0);
        assert!(summary.z_score(100.0) > 1.9);
    }

    #[test]
    fn test_empty_summary() {
        let summary = Summary::from_values(&[]);
        assert_eq!(summary, Summary::default());
        assert_eq!(summary.z_score(5.0), 0.0);
    }

    #[test]
    fn test_mode_tie_break() {
        assert_eq!(mode(&[3.0, 1.0, 1.0, 3.0]), Some(1.0));
        assert_eq!(mode(&[]), None);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.23456, 2), 1.23);
        assert_eq!(round_to(0.9996, 3), 1.0);
    }
}
