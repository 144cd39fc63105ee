//! Analytics configuration and its JSON persistence.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::compare::ComparisonThresholds;
use crate::error::{ChurnlabError, Result};
use crate::insights::InsightRules;
use crate::stats::{AnomalyConfig, ClusteringConfig, CorrelationConfig, LabelThresholds};

/// Every tunable threshold of the analytics engines.
///
/// Missing sections or keys in a loaded file take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub clustering: ClusteringConfig,
    pub anomaly: AnomalyConfig,
    pub labels: LabelThresholds,
    pub comparison: ComparisonThresholds,
    pub insights: InsightRules,
    pub correlation: CorrelationConfig,
}

impl AnalyticsConfig {
    /// Reject values no engine can work with.
    pub fn validate(&self) -> Result<()> {
        if self.clustering.max_iterations == 0 {
            return Err(ChurnlabError::Config(
                "clustering.max_iterations must be at least 1".to_string(),
            ));
        }
        let multiplier = self.anomaly.iqr_multiplier;
        if !multiplier.is_finite() || multiplier < 0.0 {
            return Err(ChurnlabError::Config(format!(
                "anomaly.iqr_multiplier must be a non-negative number, got {}",
                multiplier
            )));
        }
        if self.correlation.variables.is_empty() {
            return Err(ChurnlabError::Config(
                "correlation.variables must name at least one field".to_string(),
            ));
        }
        Ok(())
    }

    /// Load and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ChurnlabError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config: AnalyticsConfig = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|source| ChurnlabError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let file = File::create(path).map_err(|source| ChurnlabError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::NumericField;
    use tempfile::TempDir;

    #[test]
    fn test_round_trip_through_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("churnlab.json");

        let mut config = AnalyticsConfig::default();
        config.clustering.k = 4;
        config.clustering.seed = Some(7);
        config.anomaly.field = NumericField::TotalCharge;
        config.save(&path).unwrap();

        let loaded = AnalyticsConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_takes_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("partial.json");
        fs::write(&path, r#"{"anomaly": {"iqr_multiplier": 3.0}, "insights": {"churn_warning": 15.0}}"#)
            .unwrap();

        let config = AnalyticsConfig::load(&path).unwrap();
        assert_eq!(config.anomaly.iqr_multiplier, 3.0);
        assert_eq!(config.anomaly.field, NumericField::MonthlyCharge);
        assert_eq!(config.insights.churn_warning, 15.0);
        assert_eq!(config.clustering, ClusteringConfig::default());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = AnalyticsConfig::load("/nonexistent/churnlab.json").unwrap_err();
        assert!(matches!(err, ChurnlabError::Io { .. }));
    }

    #[test]
    fn test_malformed_file_is_json_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            AnalyticsConfig::load(&path).unwrap_err(),
            ChurnlabError::Json(_)
        ));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = AnalyticsConfig::default();
        config.clustering.max_iterations = 0;
        assert!(matches!(config.validate(), Err(ChurnlabError::Config(_))));

        let mut config = AnalyticsConfig::default();
        config.anomaly.iqr_multiplier = -1.0;
        assert!(config.validate().is_err());

        assert!(AnalyticsConfig::default().validate().is_ok());
    }
}
