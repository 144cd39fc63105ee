//! Record shape detection shared by the normalizer and the validator.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ChurnlabError, Result};
use crate::schema::{GROUPING_KEYS, is_known_alias};

use super::raw::RawRecord;

/// Shape of a raw input record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStructure {
    /// All fields at the top level (typical CSV).
    #[default]
    Flat,
    /// Related fields grouped in sub-objects (`{"customer": {"tenure": 3}}`).
    Nested,
    /// Grouping encoded in dotted key names (`{"customer.tenure": 3}`).
    Prefixed,
}

impl RecordStructure {
    pub fn label(&self) -> &'static str {
        match self {
            RecordStructure::Flat => "flat",
            RecordStructure::Nested => "nested",
            RecordStructure::Prefixed => "prefixed",
        }
    }
}

impl fmt::Display for RecordStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RecordStructure {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flat" => Ok(RecordStructure::Flat),
            "nested" => Ok(RecordStructure::Nested),
            "prefixed" | "dotted" => Ok(RecordStructure::Prefixed),
            other => Err(format!("unknown structure '{}'", other)),
        }
    }
}

/// Classifies the shape of a record.
pub struct StructureDetector;

impl StructureDetector {
    /// Strictly classify a sample record.
    ///
    /// Returns [`ChurnlabError::UnknownStructure`] when the record is empty or
    /// none of its keys is recognizable.
    pub fn classify(sample: &RawRecord) -> Result<RecordStructure> {
        if sample.is_empty() {
            return Err(ChurnlabError::UnknownStructure(
                "sample record has no fields".to_string(),
            ));
        }

        let nested = GROUPING_KEYS
            .iter()
            .any(|key| sample.get(*key).is_some_and(|v| v.is_object()));
        if nested {
            return Ok(RecordStructure::Nested);
        }

        if sample.keys().any(|k| k.contains('.')) {
            return Ok(RecordStructure::Prefixed);
        }

        if sample.keys().any(|k| is_known_alias(k)) {
            return Ok(RecordStructure::Flat);
        }

        Err(ChurnlabError::UnknownStructure(format!(
            "none of the fields {:?} is a known customer field",
            sample.keys().take(5).collect::<Vec<_>>()
        )))
    }

    /// Classify a sample record, degrading to `Flat` when it cannot be classified.
    pub fn detect(sample: &RawRecord) -> RecordStructure {
        match Self::classify(sample) {
            Ok(structure) => structure,
            Err(e) => {
                warn!(error = %e, "falling back to flat structure");
                RecordStructure::Flat
            }
        }
    }

    /// Detect the structure of a dataset from its first record.
    pub fn detect_dataset(records: &[RawRecord]) -> RecordStructure {
        records
            .first()
            .map(Self::detect)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> RawRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_detect_nested() {
        let r = record(json!({"customerID": "A", "customer": {"tenure": 1}}));
        assert_eq!(StructureDetector::classify(&r).unwrap(), RecordStructure::Nested);
    }

    #[test]
    fn test_detect_nested_without_account_group() {
        // Any grouping object is enough; the account group is not required.
        let r = record(json!({"customerID": "A", "internet": {"InternetService": "DSL"}}));
        assert_eq!(StructureDetector::detect(&r), RecordStructure::Nested);
    }

    #[test]
    fn test_detect_prefixed() {
        let r = record(json!({"customerID": "A", "customer.tenure": 1}));
        assert_eq!(StructureDetector::classify(&r).unwrap(), RecordStructure::Prefixed);
    }

    #[test]
    fn test_detect_flat() {
        let r = record(json!({"customer_id": "A", "tenure": 1}));
        assert_eq!(StructureDetector::classify(&r).unwrap(), RecordStructure::Flat);
    }

    #[test]
    fn test_unknown_degrades_to_flat() {
        let r = record(json!({"foo": 1, "bar": 2}));
        assert!(matches!(
            StructureDetector::classify(&r),
            Err(ChurnlabError::UnknownStructure(_))
        ));
        assert_eq!(StructureDetector::detect(&r), RecordStructure::Flat);
        assert_eq!(StructureDetector::detect(&RawRecord::new()), RecordStructure::Flat);
    }

    #[test]
    fn test_structure_from_str() {
        assert_eq!("Nested".parse::<RecordStructure>(), Ok(RecordStructure::Nested));
        assert_eq!("dotted".parse::<RecordStructure>(), Ok(RecordStructure::Prefixed));
        assert!("tree".parse::<RecordStructure>().is_err());
    }
}
