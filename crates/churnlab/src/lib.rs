//! Churnlab: customer-churn dataset reconciliation and exploratory analytics.
//!
//! Churnlab takes customer records in whatever shape they arrive (flat
//! columns, nested objects, dot-prefixed keys), maps them onto one canonical
//! record, checks their quality, and runs a fixed set of analyses: K-Means
//! segmentation, correlation, IQR anomaly detection, per-segment churn,
//! rule-based insights and multi-dataset comparison.
//!
//! # Core Principles
//!
//! - **Shape-agnostic**: one declarative alias table serves every input shape
//! - **Non-fatal rows**: malformed rows degrade to defaults and are reported
//! - **Explicit configuration**: every threshold lives in [`AnalyticsConfig`]
//!
//! # Example
//!
//! ```no_run
//! use churnlab::{Churnlab, read_records};
//!
//! let raw = read_records("customers.csv").unwrap();
//! let result = Churnlab::new().analyze(&raw, None).unwrap();
//!
//! println!("Churn rate: {:.1}%", result.kpis.churn_rate);
//! for insight in &result.insights {
//!     println!("{}", insight);
//! }
//! ```

pub mod compare;
pub mod config;
pub mod error;
pub mod filter;
pub mod input;
pub mod insights;
pub mod normalize;
pub mod schema;
pub mod stats;
pub mod validation;

mod churnlab;

pub use crate::churnlab::{AnalysisResult, Churnlab, CleaningSummary};
pub use compare::{ComparisonEngine, ComparisonResult, ComparisonThresholds};
pub use config::AnalyticsConfig;
pub use error::{ChurnlabError, Result};
pub use filter::{FilterEngine, FilterSpec};
pub use input::{RawRecord, RecordStructure, StructureDetector, read_records};
pub use insights::{Insight, InsightRules, InsightSeverity, InsightsGenerator};
pub use normalize::{SchemaNormalizer, clean, normalize};
pub use schema::{CanonicalRecord, NumericField};
pub use stats::{AnomalySet, ClusterResult, CorrelationMatrix, KMeans, detect_anomalies, k_means};
pub use validation::{RecordValidator, ValidationReport};
