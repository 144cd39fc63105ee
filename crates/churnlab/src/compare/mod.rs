//! Comparison engine: KPIs, deltas and distribution shifts across datasets.

mod engine;
mod kpi;

pub use engine::{
    CategoryDiff, CategoryShare, ComparisonEngine, ComparisonResult, ComparisonSummary,
    ComparisonThresholds, DEFAULT_CHURN_POINTS, DEFAULT_CHURN_POINTS_HIGH,
    DEFAULT_CUSTOMER_GROWTH_PCT, DEFAULT_CUSTOMER_GROWTH_PCT_HIGH, DEFAULT_REVENUE_PCT,
    DistributionDiff, PairComparison, Recommendation, compare,
};
pub use kpi::{Direction, KpiDelta, KpiMetric, Kpis};
