//! Churn rate broken down by a categorical attribute.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::schema::CanonicalRecord;

use super::descriptive::{percentage, round_to};

/// Label used for records with no value in the segment field.
pub const UNSPECIFIED_SEGMENT: &str = "Unspecified";

/// Attribute to segment customers by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentField {
    Contract,
    InternetService,
    Gender,
    PaymentMethod,
    SeniorCitizen,
}

impl SegmentField {
    pub const ALL: [SegmentField; 5] = [
        SegmentField::Contract,
        SegmentField::InternetService,
        SegmentField::Gender,
        SegmentField::PaymentMethod,
        SegmentField::SeniorCitizen,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SegmentField::Contract => "contract",
            SegmentField::InternetService => "internet_service",
            SegmentField::Gender => "gender",
            SegmentField::PaymentMethod => "payment_method",
            SegmentField::SeniorCitizen => "senior_citizen",
        }
    }

    /// Segment label of a record; empty when the field is unset.
    pub fn label<'r>(&self, record: &'r CanonicalRecord) -> &'r str {
        match self {
            SegmentField::Contract => record.billing.contract.label(),
            SegmentField::InternetService => record.services.internet_service.label(),
            SegmentField::Gender => &record.demographics.gender,
            SegmentField::PaymentMethod => &record.billing.payment_method,
            SegmentField::SeniorCitizen => {
                if record.demographics.senior_citizen {
                    "Senior"
                } else {
                    "Non-senior"
                }
            }
        }
    }
}

impl fmt::Display for SegmentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Churn figures of one segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentChurn {
    pub segment: String,
    pub customers: usize,
    pub churned: usize,
    /// Percentage, rounded to 2 decimals.
    pub churn_rate: f64,
}

/// Churn rate per segment value, in first-seen order.
pub fn churn_by_segment(records: &[CanonicalRecord], field: SegmentField) -> Vec<SegmentChurn> {
    let mut groups: IndexMap<&str, (usize, usize)> = IndexMap::new();
    for record in records {
        let label = match field.label(record).trim() {
            "" => UNSPECIFIED_SEGMENT,
            label => label,
        };
        let entry = groups.entry(label).or_insert((0, 0));
        entry.0 += 1;
        if record.churned {
            entry.1 += 1;
        }
    }

    groups
        .into_iter()
        .map(|(segment, (customers, churned))| SegmentChurn {
            segment: segment.to_string(),
            customers,
            churned,
            churn_rate: round_to(percentage(churned, customers), 2),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ContractType;

    #[test]
    fn test_churn_by_contract() {
        let mut records = Vec::new();
        for (i, (contract, churned)) in [
            (ContractType::MonthToMonth, true),
            (ContractType::MonthToMonth, false),
            (ContractType::TwoYear, false),
            (ContractType::MonthToMonth, true),
            (ContractType::Unspecified, true),
        ]
        .into_iter()
        .enumerate()
        {
            let mut r = CanonicalRecord::new(format!("C{}", i), churned);
            r.billing.contract = contract;
            records.push(r);
        }

        let segments = churn_by_segment(&records, SegmentField::Contract);
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].segment, "Month-to-month");
        assert_eq!(segments[0].customers, 3);
        assert_eq!(segments[0].churn_rate, 66.67);
        assert_eq!(segments[1].churn_rate, 0.0);
        assert_eq!(segments[2].segment, UNSPECIFIED_SEGMENT);
    }

    #[test]
    fn test_senior_segments() {
        let mut senior = CanonicalRecord::new("A", true);
        senior.demographics.senior_citizen = true;
        let records = vec![senior, CanonicalRecord::new("B", false)];

        let segments = churn_by_segment(&records, SegmentField::SeniorCitizen);
        assert_eq!(segments[0].segment, "Senior");
        assert_eq!(segments[0].churn_rate, 100.0);
        assert_eq!(segments[1].segment, "Non-senior");
    }
}
