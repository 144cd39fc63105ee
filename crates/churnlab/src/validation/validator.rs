//! Record validator: structural, per-row and duplicate checks over raw records.

use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::error::{ChurnlabError, Result};
use crate::input::{RawRecord, RecordStructure, StructureDetector, get_any, is_missing, leaf_paths, value_text};
use crate::normalize::{FieldResolver, normalize_text, parse_bool, parse_number};
use crate::schema::CanonicalField;

use super::issue::{IssueKind, ValidationIssue};
use super::report::{FieldFillRate, ValidationReport};

/// Total charges below this share of `monthly * tenure` are flagged.
pub const TOTAL_CHARGE_TOLERANCE: f64 = 0.8;

const REQUIRED_COLUMNS: &[(CanonicalField, &str)] = &[
    (CanonicalField::CustomerId, "customerID"),
    (CanonicalField::Churned, "Churn"),
];

const OPTIONAL_COLUMNS: &[(CanonicalField, &str)] = &[
    (CanonicalField::TenureMonths, "tenure"),
    (CanonicalField::MonthlyCharge, "MonthlyCharges"),
    (CanonicalField::TotalCharge, "TotalCharges"),
];

/// A check applied to every row.
pub trait RecordCheck {
    /// Inspect one row. `row` is 1-based.
    fn check(&self, row: usize, raw: &RawRecord, structure: RecordStructure) -> Vec<ValidationIssue>;
}

/// Customer id and churn flag must be present; the churn flag must be recognizable.
pub struct RequiredValueCheck;

impl RecordCheck for RequiredValueCheck {
    fn check(&self, row: usize, raw: &RawRecord, structure: RecordStructure) -> Vec<ValidationIssue> {
        let resolver = FieldResolver { raw, structure };
        let mut issues = Vec::new();

        if normalize_text(resolver.resolve(CanonicalField::CustomerId)).is_empty() {
            issues.push(
                ValidationIssue::error(IssueKind::MissingValue, "Missing customerID")
                    .at_row(row)
                    .with_field("customerID"),
            );
        }

        match resolver.resolve(CanonicalField::Churned) {
            None => issues.push(
                ValidationIssue::error(IssueKind::MissingValue, "Missing Churn value")
                    .at_row(row)
                    .with_field("Churn"),
            ),
            Some(value) if parse_bool(value).is_none() => issues.push(
                ValidationIssue::warning(
                    IssueKind::InvalidValue,
                    format!(
                        "Invalid Churn value: {} (expected Yes/No or 1/0)",
                        value_text(value)
                    ),
                )
                .at_row(row)
                .with_field("Churn")
                .with_value(value.clone()),
            ),
            Some(_) => {}
        }

        issues
    }
}

/// Tenure and charges, when present, must be non-negative numbers.
pub struct NumericRangeCheck;

impl RecordCheck for NumericRangeCheck {
    fn check(&self, row: usize, raw: &RawRecord, structure: RecordStructure) -> Vec<ValidationIssue> {
        let resolver = FieldResolver { raw, structure };

        OPTIONAL_COLUMNS
            .iter()
            .filter_map(|(field, name)| {
                let value = resolver.resolve(*field)?;
                match parse_number(value) {
                    Some(x) if x >= 0.0 => None,
                    _ => Some(
                        ValidationIssue::warning(
                            IssueKind::InvalidValue,
                            format!("Invalid {} value: {}", name, value_text(value)),
                        )
                        .at_row(row)
                        .with_field(*name)
                        .with_value(value.clone()),
                    ),
                }
            })
            .collect()
    }
}

/// Total charges should roughly cover `monthly * tenure`.
pub struct ChargeConsistencyCheck {
    tolerance: f64,
}

impl ChargeConsistencyCheck {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }
}

impl Default for ChargeConsistencyCheck {
    fn default() -> Self {
        Self::new(TOTAL_CHARGE_TOLERANCE)
    }
}

impl RecordCheck for ChargeConsistencyCheck {
    fn check(&self, row: usize, raw: &RawRecord, structure: RecordStructure) -> Vec<ValidationIssue> {
        let resolver = FieldResolver { raw, structure };
        let number = |field| resolver.resolve(field).and_then(parse_number);

        let (Some(tenure), Some(monthly), Some(total)) = (
            number(CanonicalField::TenureMonths),
            number(CanonicalField::MonthlyCharge),
            number(CanonicalField::TotalCharge),
        ) else {
            return Vec::new();
        };

        if tenure <= 0.0 || monthly <= 0.0 || total < 0.0 {
            return Vec::new();
        }

        let expected = monthly * tenure;
        if total < expected * self.tolerance {
            vec![
                ValidationIssue::warning(
                    IssueKind::Inconsistent,
                    format!(
                        "TotalCharges {:.2} is below the expected {:.2} for {} months at {:.2}",
                        total, expected, tenure, monthly
                    ),
                )
                .at_row(row)
                .with_field("TotalCharges")
                .with_value(total),
            ]
        } else {
            Vec::new()
        }
    }
}

/// Validates raw records before normalization.
pub struct RecordValidator {
    checks: Vec<Box<dyn RecordCheck>>,
}

impl Default for RecordValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordValidator {
    /// Create a validator with the standard row checks.
    pub fn new() -> Self {
        Self {
            checks: vec![
                Box::new(RequiredValueCheck),
                Box::new(NumericRangeCheck),
                Box::new(ChargeConsistencyCheck::default()),
            ],
        }
    }

    /// Add a custom row check.
    pub fn with_check(mut self, check: impl RecordCheck + 'static) -> Self {
        self.checks.push(Box::new(check));
        self
    }

    /// Validate a dataset, detecting its structure. Fails only when `records` is empty.
    pub fn validate(&self, records: &[RawRecord]) -> Result<ValidationReport> {
        self.validate_as(records, StructureDetector::detect_dataset(records))
    }

    /// Validate a dataset read with a known structure.
    pub fn validate_as(&self, records: &[RawRecord], structure: RecordStructure) -> Result<ValidationReport> {
        let Some(sample) = records.first() else {
            return Err(ChurnlabError::EmptyInput("dataset is empty".to_string()));
        };

        debug!(%structure, rows = records.len(), "validating records");

        let mut report = ValidationReport::new(structure);
        report.stats.total_rows = records.len();

        Self::check_columns(sample, structure, &mut report);

        let mut seen_ids = HashSet::with_capacity(records.len());
        for (index, raw) in records.iter().enumerate() {
            let row = index + 1;
            let issues: Vec<ValidationIssue> = self
                .checks
                .iter()
                .flat_map(|check| check.check(row, raw, structure))
                .collect();

            if issues.iter().any(|i| i.is_error()) {
                report.stats.invalid_rows += 1;
            } else {
                report.stats.valid_rows += 1;
            }
            report.stats.missing_values += issues
                .iter()
                .filter(|i| i.kind == IssueKind::MissingValue)
                .count();

            let resolver = FieldResolver { raw, structure };
            let id = normalize_text(resolver.resolve(CanonicalField::CustomerId));
            if !id.is_empty() && !seen_ids.insert(id.clone()) {
                report.stats.duplicates += 1;
                report.push(
                    ValidationIssue::warning(
                        IssueKind::Duplicate,
                        format!("Duplicate customerID found: {}", id),
                    )
                    .at_row(row)
                    .with_field("customerID")
                    .with_value(id),
                );
            }

            for issue in issues {
                report.push(issue);
            }
        }

        report.stats.column_stats = Self::fill_rates(records);
        report.is_valid = report.error_count == 0 && report.stats.valid_rows > 0;

        info!(
            valid = report.is_valid,
            errors = report.error_count,
            warnings = report.warning_count,
            valid_rows = report.stats.valid_rows,
            total_rows = report.stats.total_rows,
            "validation complete"
        );
        Ok(report)
    }

    /// Required columns are errors when absent from the sample; optional ones are warnings.
    fn check_columns(sample: &RawRecord, structure: RecordStructure, report: &mut ValidationReport) {
        let resolver = FieldResolver { raw: sample, structure };

        for (field, name) in REQUIRED_COLUMNS {
            if !resolver.is_present(*field) {
                report.push(
                    ValidationIssue::error(
                        IssueKind::MissingColumn,
                        format!("Required column missing: {}", name),
                    )
                    .with_field(*name),
                );
            }
        }

        for (field, name) in OPTIONAL_COLUMNS {
            if !resolver.is_present(*field) {
                report.push(
                    ValidationIssue::warning(
                        IssueKind::MissingColumn,
                        format!("Optional column missing: {}", name),
                    )
                    .with_field(*name),
                );
            }
        }
    }

    /// Fill rate of every leaf path seen in any record.
    fn fill_rates(records: &[RawRecord]) -> IndexMap<String, FieldFillRate> {
        let mut paths: IndexMap<String, usize> = IndexMap::new();
        for raw in records {
            for path in leaf_paths(raw) {
                paths.entry(path).or_insert(0);
            }
        }

        for raw in records {
            for (path, filled) in paths.iter_mut() {
                if get_any(raw, path).is_some_and(|v| !is_missing(v)) {
                    *filled += 1;
                }
            }
        }

        paths
            .into_iter()
            .map(|(path, filled)| (path, FieldFillRate::new(filled, records.len())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn records(value: Value) -> Vec<RawRecord> {
        serde_json::from_value(value).unwrap()
    }

    fn customer(id: &str) -> Value {
        json!({
            "customerID": id,
            "Churn": "No",
            "tenure": 2,
            "MonthlyCharges": 50.0,
            "TotalCharges": 100.0
        })
    }

    #[test]
    fn test_valid_dataset() {
        let data = records(json!([customer("A"), customer("B")]));
        let report = RecordValidator::new().validate(&data).unwrap();

        assert!(report.is_valid);
        assert_eq!(report.stats.valid_rows, 2);
        assert_eq!(report.error_count, 0);
        assert_eq!(report.warning_count, 0);
        assert_eq!(report.structure, RecordStructure::Flat);
    }

    #[test]
    fn test_validate_as_uses_given_structure() {
        let data = records(json!([customer("A"), customer("B")]));
        let validator = RecordValidator::new();

        let forced = validator.validate_as(&data, RecordStructure::Prefixed).unwrap();
        assert_eq!(forced.structure, RecordStructure::Prefixed);

        let detected = validator.validate(&data).unwrap();
        let explicit = validator.validate_as(&data, RecordStructure::Flat).unwrap();
        assert_eq!(detected, explicit);
        assert!(validator.validate_as(&[], RecordStructure::Flat).is_err());
    }

    #[test]
    fn test_missing_id_and_churn() {
        let data = records(json!([
            customer("A"),
            {"customerID": "", "tenure": 1, "MonthlyCharges": 1, "TotalCharges": 1}
        ]));
        let report = RecordValidator::new().validate(&data).unwrap();

        assert!(!report.is_valid);
        assert_eq!(report.stats.invalid_rows, 1);
        assert_eq!(report.stats.missing_values, 2);
        assert_eq!(report.errors[0].to_string(), "Row 2: Missing customerID");
        assert_eq!(report.errors[1].to_string(), "Row 2: Missing Churn value");
    }

    #[test]
    fn test_duplicates_warn_per_repeat() {
        let data = records(json!([customer("A"), customer("A"), customer("B"), customer("A")]));
        let report = RecordValidator::new().validate(&data).unwrap();

        assert!(report.is_valid);
        assert_eq!(report.stats.duplicates, 2);
        let dup_rows: Vec<_> = report
            .warnings
            .iter()
            .filter(|w| w.kind == IssueKind::Duplicate)
            .map(|w| w.row)
            .collect();
        assert_eq!(dup_rows, vec![Some(2), Some(4)]);
    }

    #[test]
    fn test_invalid_values_are_warnings() {
        let data = records(json!([{
            "customerID": "A",
            "Churn": "maybe",
            "tenure": "-4",
            "MonthlyCharges": "abc",
            "TotalCharges": 10
        }]));
        let report = RecordValidator::new().validate(&data).unwrap();

        assert!(report.is_valid);
        assert_eq!(report.warning_count, 3);
        assert!(report.warnings[0].message.contains("Invalid Churn value: maybe"));
        assert!(report.warnings[1].message.contains("Invalid tenure value: -4"));
    }

    #[test]
    fn test_missing_columns_on_sample() {
        let data = records(json!([{"customer_id": "A"}]));
        let report = RecordValidator::new().validate(&data).unwrap();

        assert!(!report.is_valid);
        assert!(report.errors.iter().any(|e| e.message == "Required column missing: Churn"));
        let optional = report
            .warnings
            .iter()
            .filter(|w| w.kind == IssueKind::MissingColumn)
            .count();
        assert_eq!(optional, 3);
    }

    #[test]
    fn test_charge_consistency() {
        let data = records(json!([{
            "customerID": "A",
            "Churn": "Yes",
            "tenure": 10,
            "MonthlyCharges": 100,
            "TotalCharges": 100
        }]));
        let report = RecordValidator::new().validate(&data).unwrap();
        assert_eq!(report.warnings[0].kind, IssueKind::Inconsistent);
    }

    #[test]
    fn test_fill_rates_include_nested_paths() {
        let data = records(json!([
            {"customerID": "A", "Churn": "No", "customer": {"tenure": 3, "gender": "F"}},
            {"customerID": "B", "Churn": "No", "customer": {"tenure": null}}
        ]));
        let report = RecordValidator::new().validate(&data).unwrap();
        let stats = &report.stats.column_stats;

        assert_eq!(report.structure, RecordStructure::Nested);
        assert_eq!(stats["customerID"].fill_rate, 1.0);
        assert_eq!(stats["customer.tenure"].filled, 1);
        assert_eq!(stats["customer.gender"].missing, 1);
    }

    #[test]
    fn test_error_cap() {
        let rows: Vec<Value> = (0..25).map(|_| json!({"customerID": "", "Churn": null})).collect();
        let report = RecordValidator::new().validate(&records(Value::Array(rows))).unwrap();

        assert_eq!(report.errors.len(), 10);
        assert_eq!(report.error_count, 50);
        assert_eq!(report.stats.valid_rows, 0);
    }

    #[test]
    fn test_empty_dataset() {
        assert!(matches!(
            RecordValidator::new().validate(&[]),
            Err(ChurnlabError::EmptyInput(_))
        ));
    }
}
