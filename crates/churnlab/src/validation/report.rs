//! Validation report produced by [`RecordValidator`](super::RecordValidator).

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::input::RecordStructure;

use super::issue::ValidationIssue;

/// Maximum number of errors and of warnings kept in a report.
pub const MAX_REPORTED_ISSUES: usize = 10;

/// How often a field carries a non-missing value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldFillRate {
    pub total: usize,
    pub filled: usize,
    pub missing: usize,
    /// `filled / total`, in `[0, 1]`.
    pub fill_rate: f64,
}

impl FieldFillRate {
    pub fn new(filled: usize, total: usize) -> Self {
        let fill_rate = if total == 0 {
            0.0
        } else {
            filled as f64 / total as f64
        };
        Self {
            total,
            filled,
            missing: total.saturating_sub(filled),
            fill_rate,
        }
    }
}

/// Row counts collected while validating.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationStats {
    pub total_rows: usize,
    pub valid_rows: usize,
    pub invalid_rows: usize,
    pub duplicates: usize,
    pub missing_values: usize,
    /// Fill rate per discovered field path, in first-seen order.
    pub column_stats: IndexMap<String, FieldFillRate>,
}

/// Outcome of validating a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub structure: RecordStructure,
    /// First errors found, at most [`MAX_REPORTED_ISSUES`].
    pub errors: Vec<ValidationIssue>,
    /// First warnings found, at most [`MAX_REPORTED_ISSUES`].
    pub warnings: Vec<ValidationIssue>,
    /// Errors found, including those not kept in `errors`.
    pub error_count: usize,
    /// Warnings found, including those not kept in `warnings`.
    pub warning_count: usize,
    pub stats: ValidationStats,
}

impl ValidationReport {
    pub(crate) fn new(structure: RecordStructure) -> Self {
        Self {
            is_valid: false,
            structure,
            errors: Vec::new(),
            warnings: Vec::new(),
            error_count: 0,
            warning_count: 0,
            stats: ValidationStats::default(),
        }
    }

    /// Record an issue, keeping only the first few of each severity.
    pub(crate) fn push(&mut self, issue: ValidationIssue) {
        let (list, count) = if issue.is_error() {
            (&mut self.errors, &mut self.error_count)
        } else {
            (&mut self.warnings, &mut self.warning_count)
        };
        *count += 1;
        if list.len() < MAX_REPORTED_ISSUES {
            list.push(issue);
        }
    }

    /// Percentage of rows that passed.
    pub fn valid_percentage(&self) -> f64 {
        if self.stats.total_rows == 0 {
            0.0
        } else {
            self.stats.valid_rows as f64 / self.stats.total_rows as f64 * 100.0
        }
    }

    /// Whether any issues were dropped from the lists because of the cap.
    pub fn is_truncated(&self) -> bool {
        self.error_count > self.errors.len() || self.warning_count > self.warnings.len()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = &self.stats;
        writeln!(
            f,
            "Validation Result: {}",
            if self.is_valid { "VALID" } else { "INVALID" }
        )?;
        writeln!(f, "Structure: {}", self.structure)?;
        writeln!(f)?;
        writeln!(f, "Total Rows: {}", stats.total_rows)?;
        writeln!(
            f,
            "Valid Rows: {} ({:.1}%)",
            stats.valid_rows,
            self.valid_percentage()
        )?;
        writeln!(f, "Invalid Rows: {}", stats.invalid_rows)?;
        writeln!(f, "Duplicates: {}", stats.duplicates)?;
        writeln!(f, "Missing Values: {}", stats.missing_values)?;

        if !self.errors.is_empty() {
            writeln!(f)?;
            writeln!(f, "Errors ({} of {}):", self.errors.len(), self.error_count)?;
            for issue in &self.errors {
                writeln!(f, "  - {}", issue)?;
            }
        }

        if !self.warnings.is_empty() {
            writeln!(f)?;
            writeln!(f, "Warnings ({} of {}):", self.warnings.len(), self.warning_count)?;
            for issue in &self.warnings {
                writeln!(f, "  - {}", issue)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::IssueKind;

    #[test]
    fn test_push_caps_lists_but_counts_all() {
        let mut report = ValidationReport::new(RecordStructure::Flat);
        for i in 0..15 {
            report.push(ValidationIssue::error(IssueKind::MissingValue, "x").at_row(i + 1));
            report.push(ValidationIssue::warning(IssueKind::Duplicate, "y").at_row(i + 1));
        }

        assert_eq!(report.errors.len(), MAX_REPORTED_ISSUES);
        assert_eq!(report.warnings.len(), MAX_REPORTED_ISSUES);
        assert_eq!(report.error_count, 15);
        assert_eq!(report.warning_count, 15);
        assert_eq!(report.errors[0].row, Some(1));
        assert!(report.is_truncated());
    }

    #[test]
    fn test_fill_rate() {
        let rate = FieldFillRate::new(3, 4);
        assert_eq!(rate.missing, 1);
        assert!((rate.fill_rate - 0.75).abs() < 1e-12);
        assert_eq!(FieldFillRate::new(0, 0).fill_rate, 0.0);
    }
}
