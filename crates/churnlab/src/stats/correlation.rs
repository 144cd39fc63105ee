//! Pearson correlation matrix over numeric projections.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::schema::{CanonicalRecord, NumericField};

use super::descriptive::round_to;

pub const DEFAULT_HIGH_CORRELATION: f64 = 0.7;

/// Which variables to correlate and what counts as a strong correlation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrelationConfig {
    pub variables: Vec<NumericField>,
    pub high_threshold: f64,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            variables: NumericField::ALL.to_vec(),
            high_threshold: DEFAULT_HIGH_CORRELATION,
        }
    }
}

/// Pearson's r from raw sums. Zero when either series is constant or empty.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n == 0 || is_constant(&x[..n]) || is_constant(&y[..n]) {
        return 0.0;
    }

    let (mut sx, mut sy, mut sxy, mut sx2, mut sy2) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for (&a, &b) in x.iter().zip(y) {
        sx += a;
        sy += b;
        sxy += a * b;
        sx2 += a * a;
        sy2 += b * b;
    }

    let n = n as f64;
    let numerator = n * sxy - sx * sy;
    let denominator = ((n * sx2 - sx * sx) * (n * sy2 - sy * sy)).sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    (numerator / denominator).clamp(-1.0, 1.0)
}

fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

/// One unordered pair of variables and their correlation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrelationPair {
    pub first: NumericField,
    pub second: NumericField,
    pub r: f64,
}

/// Symmetric correlation matrix with a unit diagonal, values rounded to 3 decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub variables: Vec<NumericField>,
    pub matrix: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Correlate the given projections over a dataset.
    pub fn compute(records: &[CanonicalRecord], variables: &[NumericField]) -> Self {
        let series: Vec<Vec<f64>> = variables
            .iter()
            .map(|&field| records.iter().map(|r| r.numeric(field)).collect())
            .collect();

        let size = variables.len();
        let mut matrix = vec![vec![0.0; size]; size];
        for i in 0..size {
            matrix[i][i] = 1.0;
            for j in (i + 1)..size {
                let r = round_to(pearson(&series[i], &series[j]), 3);
                matrix[i][j] = r;
                matrix[j][i] = r;
            }
        }

        debug!(variables = size, records = records.len(), "computed correlation matrix");
        Self {
            variables: variables.to_vec(),
            matrix,
        }
    }

    /// Correlation between two variables, if both are in the matrix.
    pub fn get(&self, a: NumericField, b: NumericField) -> Option<f64> {
        let i = self.variables.iter().position(|&v| v == a)?;
        let j = self.variables.iter().position(|&v| v == b)?;
        Some(self.matrix[i][j])
    }

    /// Pairs with `|r| > threshold`, strongest first.
    pub fn high_correlations(&self, threshold: f64) -> Vec<CorrelationPair> {
        let mut pairs = Vec::new();
        for i in 0..self.variables.len() {
            for j in (i + 1)..self.variables.len() {
                let r = self.matrix[i][j];
                if r.abs() > threshold {
                    pairs.push(CorrelationPair {
                        first: self.variables[i],
                        second: self.variables[j],
                        r,
                    });
                }
            }
        }
        pairs.sort_by(|a, b| b.r.abs().total_cmp(&a.r.abs()));
        pairs
    }
}

/// Correlation matrix over a dataset.
pub fn correlation_matrix(records: &[CanonicalRecord], variables: &[NumericField]) -> CorrelationMatrix {
    CorrelationMatrix::compute(records, variables)
}
