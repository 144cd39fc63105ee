//! Main Churnlab service object and public pipeline API.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::compare::{ComparisonEngine, ComparisonResult, Kpis};
use crate::config::AnalyticsConfig;
use crate::error::{ChurnlabError, Result};
use crate::input::{RawRecord, RecordStructure, StructureDetector};
use crate::insights::{Insight, InsightsGenerator};
use crate::normalize::{CleanOutcome, SchemaNormalizer, clean};
use crate::schema::{CanonicalRecord, NumericField};
use crate::stats::{
    AnomalySet, ClusterResult, CorrelationMatrix, CorrelationPair, KMeans, SegmentChurn,
    SegmentField, Summary, churn_by_segment, detect_anomalies,
};
use crate::validation::{RecordValidator, ValidationReport};

/// How many records the cleaning step kept and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CleaningSummary {
    pub input: usize,
    pub kept: usize,
    pub dropped_missing_id: usize,
    pub dropped_duplicates: usize,
}

impl CleaningSummary {
    fn from_outcome(input: usize, outcome: &CleanOutcome) -> Self {
        Self {
            input,
            kept: outcome.records.len(),
            dropped_missing_id: outcome.dropped_missing_id,
            dropped_duplicates: outcome.dropped_duplicates,
        }
    }
}

/// Everything `analyze` derives from one dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub analyzed_at: DateTime<Utc>,
    /// Structure used to read the raw records.
    pub structure: RecordStructure,
    pub validation: ValidationReport,
    pub cleaning: CleaningSummary,
    pub kpis: Kpis,
    /// Descriptive statistics per numeric projection.
    pub descriptive: IndexMap<NumericField, Summary>,
    pub clusters: ClusterResult,
    pub correlation: CorrelationMatrix,
    pub high_correlations: Vec<CorrelationPair>,
    pub anomalies: AnomalySet,
    pub segments: IndexMap<SegmentField, Vec<SegmentChurn>>,
    pub insights: Vec<Insight>,
    /// Cleaned canonical records the analysis ran on.
    #[serde(skip)]
    pub records: Vec<CanonicalRecord>,
}

/// Runs the churn analytics pipeline with an explicit configuration.
///
/// Each call reads its input and returns a fresh result, so one instance can
/// serve any number of datasets.
#[derive(Debug, Clone, Default)]
pub struct Churnlab {
    config: AnalyticsConfig,
}

impl Churnlab {
    /// Create an instance with default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AnalyticsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Validate raw records without transforming them.
    pub fn validate(&self, raw: &[RawRecord]) -> Result<ValidationReport> {
        RecordValidator::new().validate(raw)
    }

    /// Normalize raw records and clean the result.
    pub fn normalize(&self, raw: &[RawRecord], hint: Option<RecordStructure>) -> Result<CleanOutcome> {
        let structure = hint.unwrap_or_else(|| StructureDetector::detect_dataset(raw));
        let records = SchemaNormalizer::with_structure(structure).normalize(raw)?;
        Ok(clean(records))
    }

    /// Full single-dataset pipeline: validate, normalize, clean, then run
    /// every analysis on the cleaned records.
    ///
    /// Row-level validation problems are reported, never fatal. Fails with
    /// [`ChurnlabError::EmptyInput`] when there are no records, or none
    /// survive cleaning.
    pub fn analyze(&self, raw: &[RawRecord], hint: Option<RecordStructure>) -> Result<AnalysisResult> {
        let structure = hint.unwrap_or_else(|| StructureDetector::detect_dataset(raw));
        let validation = RecordValidator::new().validate_as(raw, structure)?;

        let outcome = self.normalize(raw, Some(structure))?;
        let cleaning = CleaningSummary::from_outcome(raw.len(), &outcome);
        let records = outcome.records;
        if records.is_empty() {
            return Err(ChurnlabError::EmptyInput(
                "no records left after cleaning".to_string(),
            ));
        }

        let config = &self.config;
        let clusters = KMeans::new(config.clustering, config.labels).run(&records)?;
        let correlation = CorrelationMatrix::compute(&records, &config.correlation.variables);
        let high_correlations = correlation.high_correlations(config.correlation.high_threshold);
        let anomalies = detect_anomalies(
            &records,
            config.anomaly.field,
            config.anomaly.iqr_multiplier,
        );
        let descriptive = NumericField::ALL
            .iter()
            .map(|&field| (field, Summary::of_field(&records, field)))
            .collect();
        let segments = SegmentField::ALL
            .iter()
            .map(|&field| (field, churn_by_segment(&records, field)))
            .collect();
        let insights = self.insights(&records);

        info!(
            %structure,
            records = records.len(),
            clusters = clusters.k,
            anomalies = anomalies.anomalies.len(),
            insights = insights.len(),
            "analysis complete"
        );

        Ok(AnalysisResult {
            analyzed_at: Utc::now(),
            structure,
            validation,
            cleaning,
            kpis: Kpis::compute(&records),
            descriptive,
            clusters,
            correlation,
            high_correlations,
            anomalies,
            segments,
            insights,
            records,
        })
    }

    /// Run the insight rules over canonical records.
    pub fn insights(&self, records: &[CanonicalRecord]) -> Vec<Insight> {
        InsightsGenerator::with_rules(self.config.insights.clone()).generate(records)
    }

    /// Normalize and clean each raw dataset, then compare them pairwise.
    pub fn compare(&self, raw_datasets: &[Vec<RawRecord>]) -> Result<ComparisonResult> {
        if raw_datasets.len() < 2 {
            return Err(ChurnlabError::InsufficientData {
                required: 2,
                actual: raw_datasets.len(),
            });
        }

        let datasets = raw_datasets
            .iter()
            .map(|raw| self.normalize(raw, None).map(|outcome| outcome.records))
            .collect::<Result<Vec<_>>>()?;
        debug!(datasets = datasets.len(), "normalized datasets for comparison");

        ComparisonEngine::with_config(self.config.comparison).compare(&datasets)
    }
}
