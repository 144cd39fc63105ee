//! Statistics engine: descriptive statistics, K-Means, correlation,
//! anomaly detection and churn segmentation.
//!
//! Every function here reads an immutable dataset and returns a new value,
//! so independent analyses can run on separate threads over the same slice.

mod anomaly;
mod correlation;
mod descriptive;
mod kmeans;
mod segments;

pub use anomaly::{
    Anomaly, AnomalyBounds, AnomalyConfig, AnomalyKind, AnomalySet, AnomalyStats,
    DEFAULT_IQR_MULTIPLIER, detect_anomalies,
};
pub use correlation::{
    CorrelationConfig, CorrelationMatrix, CorrelationPair, DEFAULT_HIGH_CORRELATION,
    correlation_matrix, pearson,
};
pub use descriptive::{Summary, mean, mode, percentage, population_std, quantile, round_to, sorted_finite};
pub use kmeans::{
    ClusterLabel, ClusterProfile, ClusterResult, ClusteringConfig, DEFAULT_HIGH_VALUE,
    DEFAULT_HIGH_VALUE_RISK, DEFAULT_K, DEFAULT_LOW_VALUE_RISK, DEFAULT_MAX_ITERATIONS,
    DEFAULT_MEDIUM_VALUE, DEFAULT_MEDIUM_VALUE_RISK, FEATURES, FeatureScaling, KMeans,
    LabelThresholds, MAX_RECOMMENDED_K, MIN_RECOMMENDED_K, Point, k_means,
};
pub use segments::{SegmentChurn, SegmentField, UNSPECIFIED_SEGMENT, churn_by_segment};
