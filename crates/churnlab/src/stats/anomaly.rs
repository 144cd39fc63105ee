//! IQR-based outlier detection on one numeric projection.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::schema::{CanonicalRecord, NumericField};

use super::descriptive::{Summary, percentage};

pub const DEFAULT_IQR_MULTIPLIER: f64 = 1.5;

/// Which field to scan and how wide the fences are.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    pub field: NumericField,
    pub iqr_multiplier: f64,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            field: NumericField::MonthlyCharge,
            iqr_multiplier: DEFAULT_IQR_MULTIPLIER,
        }
    }
}

/// Side of the fence a value fell on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalyKind {
    Lower,
    Upper,
}

/// A flagged record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    /// Position of the record in the input.
    pub index: usize,
    pub customer_id: String,
    pub value: f64,
    /// Against the whole field's mean and population standard deviation.
    pub z_score: f64,
    pub kind: AnomalyKind,
}

/// Inclusive fences `[Q1 - t*IQR, Q3 + t*IQR]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnomalyBounds {
    pub lower: f64,
    pub upper: f64,
}

/// Distribution of the scanned field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnomalyStats {
    pub summary: Summary,
    pub anomaly_count: usize,
    /// Percentage of scanned values that were flagged.
    pub anomaly_rate: f64,
}

/// Result of an anomaly scan. `bounds` and `stats` are absent when the field had no values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalySet {
    pub field: NumericField,
    pub iqr_multiplier: f64,
    pub anomalies: Vec<Anomaly>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<AnomalyBounds>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<AnomalyStats>,
}

impl AnomalySet {
    fn empty(field: NumericField, iqr_multiplier: f64) -> Self {
        Self {
            field,
            iqr_multiplier,
            anomalies: Vec::new(),
            bounds: None,
            stats: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.anomalies.is_empty()
    }

    pub fn upper(&self) -> impl Iterator<Item = &Anomaly> {
        self.anomalies.iter().filter(|a| a.kind == AnomalyKind::Upper)
    }

    pub fn lower(&self) -> impl Iterator<Item = &Anomaly> {
        self.anomalies.iter().filter(|a| a.kind == AnomalyKind::Lower)
    }
}

/// Flag records whose field value falls outside the IQR fences.
pub fn detect_anomalies(
    records: &[CanonicalRecord],
    field: NumericField,
    iqr_multiplier: f64,
) -> AnomalySet {
    let values: Vec<(usize, f64)> = records
        .iter()
        .enumerate()
        .map(|(idx, r)| (idx, r.numeric(field)))
        .filter(|(_, v)| v.is_finite())
        .collect();

    if values.is_empty() {
        return AnomalySet::empty(field, iqr_multiplier);
    }

    let raw: Vec<f64> = values.iter().map(|(_, v)| *v).collect();
    let summary = Summary::from_values(&raw);
    let bounds = AnomalyBounds {
        lower: summary.q1 - iqr_multiplier * summary.iqr,
        upper: summary.q3 + iqr_multiplier * summary.iqr,
    };

    let anomalies: Vec<Anomaly> = values
        .iter()
        .filter_map(|&(index, value)| {
            let kind = if value < bounds.lower {
                AnomalyKind::Lower
            } else if value > bounds.upper {
                AnomalyKind::Upper
            } else {
                return None;
            };
            Some(Anomaly {
                index,
                customer_id: records[index].customer_id.clone(),
                value,
                z_score: summary.z_score(value),
                kind,
            })
        })
        .collect();

    debug!(
        %field,
        scanned = values.len(),
        anomalies = anomalies.len(),
        lower = bounds.lower,
        upper = bounds.upper,
        "anomaly scan complete"
    );

    AnomalySet {
        field,
        iqr_multiplier,
        stats: Some(AnomalyStats {
            summary,
            anomaly_count: anomalies.len(),
            anomaly_rate: percentage(anomalies.len(), values.len()),
        }),
        anomalies,
        bounds: Some(bounds),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_monthly(values: &[f64]) -> Vec<CanonicalRecord> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let mut r = CanonicalRecord::new(format!("C{}", i), false);
                r.billing.monthly_charge = v;
                r
            })
            .collect()
    }

    #[test]
    fn test_single_upper_outlier() {
        let records = with_monthly(&[10.0, 10.0, 10.0, 10.0, 100.0]);
        let set = detect_anomalies(&records, NumericField::MonthlyCharge, 1.5);

        assert_eq!(set.anomalies.len(), 1);
        let a = &set.anomalies[0];
        assert_eq!(a.index, 4);
        assert_eq!(a.customer_id, "C4");
        assert_eq!(a.kind, AnomalyKind::Upper);
        assert!((a.z_score - 2.0).abs() < 1e-12);
        assert_eq!(set.bounds, Some(AnomalyBounds { lower: 10.0, upper: 10.0 }));
        assert_eq!(set.stats.unwrap().anomaly_rate, 20.0);
    }

    #[test]
    fn test_lower_outlier() {
        let records = with_monthly(&[50.0, 52.0, 49.0, 51.0, 50.0, 1.0]);
        let set = detect_anomalies(&records, NumericField::MonthlyCharge, 1.5);
        assert_eq!(set.lower().count(), 1);
        assert_eq!(set.upper().count(), 0);
        assert!(set.anomalies[0].z_score < 0.0);
    }

    #[test]
    fn test_empty_input_is_empty_set() {
        let set = detect_anomalies(&[], NumericField::TotalCharge, 1.5);
        assert!(set.is_empty());
        assert!(set.bounds.is_none());
        assert!(set.stats.is_none());
    }

    #[test]
    fn test_no_spread_no_anomalies() {
        let records = with_monthly(&[5.0; 8]);
        let set = detect_anomalies(&records, NumericField::MonthlyCharge, 1.5);
        assert!(set.is_empty());
        assert!(set.bounds.is_some());
    }
}
