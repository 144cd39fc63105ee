//! Row-level validation findings.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of problem found in a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// A required or optional column is absent from the sample record.
    MissingColumn,
    /// A required value is absent in a row.
    MissingValue,
    /// A value is present but not usable (non-numeric, negative, unknown flag).
    InvalidValue,
    /// The customer id was already seen in an earlier row.
    Duplicate,
    /// Related values disagree with each other.
    Inconsistent,
}

impl IssueKind {
    pub fn label(&self) -> &'static str {
        match self {
            IssueKind::MissingColumn => "Missing Column",
            IssueKind::MissingValue => "Missing Value",
            IssueKind::InvalidValue => "Invalid Value",
            IssueKind::Duplicate => "Duplicate",
            IssueKind::Inconsistent => "Inconsistent",
        }
    }
}

/// Severity of a validation issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Worth reviewing; the row is still usable.
    Warning,
    /// The row cannot be used.
    Error,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Warning => "Warning",
            Severity::Error => "Error",
        }
    }
}

/// One finding about a dataset or a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub kind: IssueKind,
    pub severity: Severity,
    /// 1-based row number; `None` for dataset-level findings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    /// Source column the issue refers to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// The offending value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    pub message: String,
}

impl ValidationIssue {
    /// Create a new issue.
    pub fn new(kind: IssueKind, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity,
            row: None,
            field: None,
            value: None,
            message: message.into(),
        }
    }

    pub fn error(kind: IssueKind, message: impl Into<String>) -> Self {
        Self::new(kind, Severity::Error, message)
    }

    pub fn warning(kind: IssueKind, message: impl Into<String>) -> Self {
        Self::new(kind, Severity::Warning, message)
    }

    /// Set the 1-based row number.
    pub fn at_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }

    /// Set the field name.
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Set the offending value.
    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.row {
            Some(row) => write!(f, "Row {}: {}", row, self.message),
            None => f.write_str(&self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_builder_and_display() {
        let issue = ValidationIssue::error(IssueKind::MissingValue, "Missing customerID")
            .at_row(3)
            .with_field("customerID");

        assert!(issue.is_error());
        assert_eq!(issue.field.as_deref(), Some("customerID"));
        assert_eq!(issue.to_string(), "Row 3: Missing customerID");

        let dataset_level = ValidationIssue::warning(IssueKind::MissingColumn, "Optional column missing: tenure");
        assert_eq!(dataset_level.to_string(), "Optional column missing: tenure");
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Error > Severity::Warning);
    }
}
