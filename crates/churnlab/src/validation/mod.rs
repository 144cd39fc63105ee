//! Record validation and reporting.

mod issue;
mod report;
mod validator;

pub use issue::{IssueKind, Severity, ValidationIssue};
pub use report::{FieldFillRate, MAX_REPORTED_ISSUES, ValidationReport, ValidationStats};
pub use validator::{
    ChargeConsistencyCheck, NumericRangeCheck, RecordCheck, RecordValidator, RequiredValueCheck,
    TOTAL_CHARGE_TOLERANCE,
};
