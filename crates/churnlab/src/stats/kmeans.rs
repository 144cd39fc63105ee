//! K-Means clustering over (tenure, monthly charge, total charge).
//!
//! Features are min-max scaled to `[0, 1]`, centroids are seeded with
//! K-Means++ and the Lloyd iteration stops once an assignment pass changes
//! nothing or the iteration cap is reached.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ChurnlabError, Result};
use crate::schema::CanonicalRecord;

use super::descriptive::{mean, percentage, round_to};

/// Number of features per point.
pub const FEATURES: usize = 3;

pub const DEFAULT_K: usize = 3;
pub const DEFAULT_MAX_ITERATIONS: usize = 100;
pub const MIN_RECOMMENDED_K: usize = 2;
pub const MAX_RECOMMENDED_K: usize = 5;

/// A point in feature space.
pub type Point = [f64; FEATURES];

/// Clustering parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    pub k: usize,
    pub max_iterations: usize,
    /// Fixed RNG seed for reproducible seeding; random when absent.
    pub seed: Option<u64>,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            k: DEFAULT_K,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            seed: None,
        }
    }
}

pub const DEFAULT_MEDIUM_VALUE: f64 = 50.0;
pub const DEFAULT_HIGH_VALUE: f64 = 80.0;
pub const DEFAULT_LOW_VALUE_RISK: f64 = 30.0;
pub const DEFAULT_MEDIUM_VALUE_RISK: f64 = 20.0;
pub const DEFAULT_HIGH_VALUE_RISK: f64 = 15.0;

/// Boundaries used to name clusters. Charges in currency units, risks in churn percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelThresholds {
    /// Average monthly charge from which a cluster is medium value.
    pub medium_value: f64,
    /// Average monthly charge from which a cluster is high value.
    pub high_value: f64,
    /// Churn rate above which a low-value cluster is high risk.
    pub low_value_risk: f64,
    /// Churn rate above which a medium-value cluster is medium risk.
    pub medium_value_risk: f64,
    /// Churn rate above which a high-value cluster is medium risk.
    pub high_value_risk: f64,
}

impl Default for LabelThresholds {
    fn default() -> Self {
        Self {
            medium_value: DEFAULT_MEDIUM_VALUE,
            high_value: DEFAULT_HIGH_VALUE,
            low_value_risk: DEFAULT_LOW_VALUE_RISK,
            medium_value_risk: DEFAULT_MEDIUM_VALUE_RISK,
            high_value_risk: DEFAULT_HIGH_VALUE_RISK,
        }
    }
}

/// Qualitative name of a cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterLabel {
    LowValueHighRisk,
    LowValueLowRisk,
    MediumValueMediumRisk,
    MediumValueLowRisk,
    HighValueMediumRisk,
    HighValueLowRisk,
    MixedProfile,
}

impl ClusterLabel {
    /// Bucket a cluster by average monthly charge and churn rate (percent).
    pub fn classify(avg_monthly: f64, churn_rate: f64, t: &LabelThresholds) -> Self {
        if avg_monthly < t.medium_value {
            if churn_rate > t.low_value_risk {
                ClusterLabel::LowValueHighRisk
            } else {
                ClusterLabel::LowValueLowRisk
            }
        } else if avg_monthly < t.high_value {
            if churn_rate > t.medium_value_risk {
                ClusterLabel::MediumValueMediumRisk
            } else {
                ClusterLabel::MediumValueLowRisk
            }
        } else if avg_monthly >= t.high_value {
            if churn_rate > t.high_value_risk {
                ClusterLabel::HighValueMediumRisk
            } else {
                ClusterLabel::HighValueLowRisk
            }
        } else {
            // Only reachable with a NaN average.
            ClusterLabel::MixedProfile
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ClusterLabel::LowValueHighRisk => "Low Value, High Risk",
            ClusterLabel::LowValueLowRisk => "Low Value, Low Risk",
            ClusterLabel::MediumValueMediumRisk => "Medium Value, Medium Risk",
            ClusterLabel::MediumValueLowRisk => "Medium Value, Low Risk",
            ClusterLabel::HighValueMediumRisk => "High Value, Medium Risk",
            ClusterLabel::HighValueLowRisk => "High Value, Low Risk",
            ClusterLabel::MixedProfile => "Mixed Profile",
        }
    }
}

impl fmt::Display for ClusterLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-feature min-max bounds used to scale points into `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureScaling {
    pub min: Point,
    pub max: Point,
}

impl FeatureScaling {
    fn fit(points: &[Point]) -> Self {
        let mut min = [f64::INFINITY; FEATURES];
        let mut max = [f64::NEG_INFINITY; FEATURES];
        for p in points {
            for i in 0..FEATURES {
                min[i] = min[i].min(p[i]);
                max[i] = max[i].max(p[i]);
            }
        }
        Self { min, max }
    }

    /// Scale a raw point. A feature with zero range maps to 0.
    pub fn scale(&self, point: &Point) -> Point {
        let mut out = [0.0; FEATURES];
        for i in 0..FEATURES {
            let range = self.max[i] - self.min[i];
            out[i] = if range == 0.0 {
                0.0
            } else {
                (point[i] - self.min[i]) / range
            };
        }
        out
    }

    /// Map a scaled point back to raw units.
    pub fn unscale(&self, point: &Point) -> Point {
        let mut out = [0.0; FEATURES];
        for i in 0..FEATURES {
            out[i] = self.min[i] + point[i] * (self.max[i] - self.min[i]);
        }
        out
    }
}

/// Summary of the records assigned to one cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterProfile {
    pub cluster: usize,
    pub size: usize,
    /// Rounded to 1 decimal.
    pub avg_tenure: f64,
    /// Rounded to 2 decimals.
    pub avg_monthly: f64,
    /// Rounded to 2 decimals.
    pub avg_total: f64,
    /// Churn percentage, rounded to 2 decimals.
    pub churn_rate: f64,
    /// `None` for an empty cluster.
    pub label: Option<ClusterLabel>,
}

/// Outcome of a K-Means run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterResult {
    /// Effective number of clusters after clamping.
    pub k: usize,
    /// Centroids in scaled `[0, 1]` space.
    pub centroids: Vec<Point>,
    /// Cluster of each input record, aligned with the input; `None` when excluded.
    pub assignments: Vec<Option<usize>>,
    pub profiles: Vec<ClusterProfile>,
    pub iterations: usize,
    pub converged: bool,
    /// Within-cluster sum of squared distances in scaled space.
    pub inertia: f64,
    pub scaling: FeatureScaling,
}

impl ClusterResult {
    pub fn cluster_of(&self, index: usize) -> Option<usize> {
        self.assignments.get(index).copied().flatten()
    }

    /// Centroids mapped back to raw units.
    pub fn raw_centroids(&self) -> Vec<Point> {
        self.centroids.iter().map(|c| self.scaling.unscale(c)).collect()
    }
}

/// K-Means engine with explicit configuration.
#[derive(Debug, Clone, Default)]
pub struct KMeans {
    config: ClusteringConfig,
    labels: LabelThresholds,
}

impl KMeans {
    pub fn new(config: ClusteringConfig, labels: LabelThresholds) -> Self {
        Self { config, labels }
    }

    pub fn with_config(config: ClusteringConfig) -> Self {
        Self::new(config, LabelThresholds::default())
    }

    /// Cluster a dataset.
    ///
    /// Fails with [`ChurnlabError::EmptyInput`] when no record has finite features.
    pub fn run(&self, records: &[CanonicalRecord]) -> Result<ClusterResult> {
        let (indices, raw_points) = extract_features(records);
        if raw_points.is_empty() {
            return Err(ChurnlabError::EmptyInput(
                "no records with finite features to cluster".to_string(),
            ));
        }

        let n = raw_points.len();
        let k = self.effective_k(n);
        let scaling = FeatureScaling::fit(&raw_points);
        let points: Vec<Point> = raw_points.iter().map(|p| scaling.scale(p)).collect();

        let mut rng = match self.config.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };

        let mut centroids = seed_centroids(&points, k, &mut rng);
        let mut assignments = assign(&points, &centroids);
        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.config.max_iterations {
            centroids = recompute_centroids(&points, &assignments, k, &mut rng);
            let next = assign(&points, &centroids);
            iterations += 1;
            if next == assignments {
                converged = true;
                break;
            }
            assignments = next;
        }

        let inertia: f64 = points
            .iter()
            .zip(&assignments)
            .map(|(p, &c)| squared_distance(p, &centroids[c]))
            .sum();

        if converged {
            info!(k, iterations, points = n, "k-means converged");
        } else {
            warn!(k, iterations, points = n, "k-means stopped at iteration cap");
        }

        let mut aligned = vec![None; records.len()];
        for (&record_idx, &cluster) in indices.iter().zip(&assignments) {
            aligned[record_idx] = Some(cluster);
        }

        let profiles = (0..k)
            .map(|cluster| self.profile(cluster, records, &aligned))
            .collect();

        Ok(ClusterResult {
            k,
            centroids,
            assignments: aligned,
            profiles,
            iterations,
            converged,
            inertia,
            scaling,
        })
    }

    fn effective_k(&self, n: usize) -> usize {
        let requested = self.config.k;
        if !(MIN_RECOMMENDED_K..=MAX_RECOMMENDED_K).contains(&requested) {
            debug!(
                k = requested,
                "k outside the recommended range {}..={}", MIN_RECOMMENDED_K, MAX_RECOMMENDED_K
            );
        }
        let k = requested.clamp(1, n);
        if k != requested {
            warn!(requested, effective = k, points = n, "clamped k to the number of points");
        }
        k
    }

    fn profile(
        &self,
        cluster: usize,
        records: &[CanonicalRecord],
        aligned: &[Option<usize>],
    ) -> ClusterProfile {
        let members: Vec<&CanonicalRecord> = records
            .iter()
            .zip(aligned)
            .filter(|(_, c)| **c == Some(cluster))
            .map(|(r, _)| r)
            .collect();

        if members.is_empty() {
            return ClusterProfile {
                cluster,
                size: 0,
                avg_tenure: 0.0,
                avg_monthly: 0.0,
                avg_total: 0.0,
                churn_rate: 0.0,
                label: None,
            };
        }

        let avg = |f: fn(&CanonicalRecord) -> f64| {
            mean(&members.iter().map(|r| f(r)).collect::<Vec<_>>())
        };
        let avg_tenure = avg(|r| f64::from(r.demographics.tenure_months));
        let avg_monthly = avg(|r| r.billing.monthly_charge);
        let avg_total = avg(|r| r.billing.total_charge);
        let churned = members.iter().filter(|r| r.churned).count();
        let churn_rate = percentage(churned, members.len());

        ClusterProfile {
            cluster,
            size: members.len(),
            avg_tenure: round_to(avg_tenure, 1),
            avg_monthly: round_to(avg_monthly, 2),
            avg_total: round_to(avg_total, 2),
            churn_rate: round_to(churn_rate, 2),
            label: Some(ClusterLabel::classify(avg_monthly, churn_rate, &self.labels)),
        }
    }
}

/// Run K-Means with default labels and a random seed.
pub fn k_means(records: &[CanonicalRecord], k: usize, max_iterations: usize) -> Result<ClusterResult> {
    KMeans::with_config(ClusteringConfig {
        k,
        max_iterations,
        seed: None,
    })
    .run(records)
}

/// Feature vectors of records whose features are all finite, with their input indices.
fn extract_features(records: &[CanonicalRecord]) -> (Vec<usize>, Vec<Point>) {
    records
        .iter()
        .enumerate()
        .filter_map(|(idx, r)| {
            let point = [
                f64::from(r.demographics.tenure_months),
                r.billing.monthly_charge,
                r.billing.total_charge,
            ];
            point.iter().all(|v| v.is_finite()).then_some((idx, point))
        })
        .unzip()
}

fn squared_distance(a: &Point, b: &Point) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// K-Means++ seeding: first centroid uniform, the rest weighted by squared
/// distance to the nearest chosen centroid.
fn seed_centroids(points: &[Point], k: usize, rng: &mut fastrand::Rng) -> Vec<Point> {
    let n = points.len();
    let mut centroids = Vec::with_capacity(k);
    centroids.push(points[rng.usize(0..n)]);

    while centroids.len() < k {
        let weights: Vec<f64> = points
            .iter()
            .map(|p| {
                centroids
                    .iter()
                    .map(|c| squared_distance(p, c))
                    .fold(f64::INFINITY, f64::min)
            })
            .collect();
        let total: f64 = weights.iter().sum();

        let next = if total > 0.0 {
            let threshold = rng.f64() * total;
            let mut cumulative = 0.0;
            let mut chosen = None;
            for (j, &w) in weights.iter().enumerate() {
                if w <= 0.0 {
                    continue;
                }
                cumulative += w;
                chosen = Some(j);
                if cumulative > threshold {
                    break;
                }
            }
            chosen.unwrap_or_else(|| rng.usize(0..n))
        } else {
            // Every point coincides with a centroid.
            rng.usize(0..n)
        };
        centroids.push(points[next]);
    }

    centroids
}

/// Nearest centroid per point; ties go to the lowest index.
fn assign(points: &[Point], centroids: &[Point]) -> Vec<usize> {
    points
        .iter()
        .map(|p| {
            let mut best = 0;
            let mut best_dist = f64::INFINITY;
            for (idx, c) in centroids.iter().enumerate() {
                let d = squared_distance(p, c);
                if d < best_dist {
                    best = idx;
                    best_dist = d;
                }
            }
            best
        })
        .collect()
}

/// Mean of each cluster's points; an empty cluster is reseeded with a random point.
fn recompute_centroids(
    points: &[Point],
    assignments: &[usize],
    k: usize,
    rng: &mut fastrand::Rng,
) -> Vec<Point> {
    let mut sums = vec![[0.0; FEATURES]; k];
    let mut counts = vec![0usize; k];
    for (p, &c) in points.iter().zip(assignments) {
        counts[c] += 1;
        for i in 0..FEATURES {
            sums[c][i] += p[i];
        }
    }

    sums.into_iter()
        .zip(counts)
        .enumerate()
        .map(|(cluster, (sum, count))| {
            if count == 0 {
                debug!(cluster, "reseeding empty cluster");
                points[rng.usize(0..points.len())]
            } else {
                sum.map(|s| s / count as f64)
            }
        })
        .collect()
}
