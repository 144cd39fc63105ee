//! Insight rule engine.

mod generator;
mod insight;
mod rules;

pub use generator::InsightsGenerator;
pub use insight::{
    Impact, Insight, InsightCategory, InsightSeverity, by_category, by_severity, critical,
    sort_by_severity,
};
pub use rules::*;
