//! Canonical customer record.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::types::{ContractType, InternetServiceType, ServiceFlag};

/// Demographic attributes of a customer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Demographics {
    pub gender: String,
    pub senior_citizen: bool,
    pub has_partner: bool,
    pub has_dependents: bool,
    pub tenure_months: u32,
}

/// Subscribed services.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Services {
    pub phone_service: bool,
    pub multiple_lines: ServiceFlag,
    pub internet_service: InternetServiceType,
    pub online_security: ServiceFlag,
    pub online_backup: ServiceFlag,
    pub device_protection: ServiceFlag,
    pub tech_support: ServiceFlag,
    pub streaming_tv: ServiceFlag,
    pub streaming_movies: ServiceFlag,
}

/// Contract and charges.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Billing {
    pub contract: ContractType,
    pub paperless_billing: bool,
    pub payment_method: String,
    /// Finite and non-negative after normalization.
    pub monthly_charge: f64,
    /// Finite and non-negative after normalization.
    pub total_charge: f64,
}

/// The unified internal representation of one customer account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalRecord {
    pub customer_id: String,
    pub churned: bool,
    pub demographics: Demographics,
    pub services: Services,
    pub billing: Billing,
}

impl CanonicalRecord {
    /// Create a record with the given id and churn flag; everything else defaulted.
    pub fn new(customer_id: impl Into<String>, churned: bool) -> Self {
        Self {
            customer_id: customer_id.into(),
            churned,
            ..Default::default()
        }
    }

    /// Project a numeric field.
    pub fn numeric(&self, field: NumericField) -> f64 {
        match field {
            NumericField::Tenure => f64::from(self.demographics.tenure_months),
            NumericField::MonthlyCharge => self.billing.monthly_charge,
            NumericField::TotalCharge => self.billing.total_charge,
            NumericField::SeniorCitizen => bool_to_f64(self.demographics.senior_citizen),
            NumericField::Churn => bool_to_f64(self.churned),
        }
    }

    /// "Yes"/"No" churn label.
    pub fn churn_label(&self) -> &'static str {
        yes_no(self.churned)
    }

    /// Flatten into a single-level row keyed by the conventional column names.
    pub fn to_flat_row(&self) -> IndexMap<String, Value> {
        let d = &self.demographics;
        let s = &self.services;
        let b = &self.billing;

        let mut row = IndexMap::new();
        row.insert("customerID".to_string(), json!(self.customer_id));
        row.insert("Churn".to_string(), json!(self.churn_label()));
        row.insert("gender".to_string(), json!(d.gender));
        row.insert("SeniorCitizen".to_string(), json!(u8::from(d.senior_citizen)));
        row.insert("Partner".to_string(), json!(yes_no(d.has_partner)));
        row.insert("Dependents".to_string(), json!(yes_no(d.has_dependents)));
        row.insert("tenure".to_string(), json!(d.tenure_months));
        row.insert("PhoneService".to_string(), json!(yes_no(s.phone_service)));
        row.insert("MultipleLines".to_string(), json!(s.multiple_lines.label()));
        row.insert("InternetService".to_string(), json!(s.internet_service.label()));
        row.insert("OnlineSecurity".to_string(), json!(s.online_security.label()));
        row.insert("OnlineBackup".to_string(), json!(s.online_backup.label()));
        row.insert("DeviceProtection".to_string(), json!(s.device_protection.label()));
        row.insert("TechSupport".to_string(), json!(s.tech_support.label()));
        row.insert("StreamingTV".to_string(), json!(s.streaming_tv.label()));
        row.insert("StreamingMovies".to_string(), json!(s.streaming_movies.label()));
        row.insert("Contract".to_string(), json!(b.contract.label()));
        row.insert("PaperlessBilling".to_string(), json!(yes_no(b.paperless_billing)));
        row.insert("PaymentMethod".to_string(), json!(b.payment_method));
        row.insert("MonthlyCharges".to_string(), json!(b.monthly_charge));
        row.insert("TotalCharges".to_string(), json!(b.total_charge));
        row
    }
}

fn bool_to_f64(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}

fn yes_no(value: bool) -> &'static str {
    if value { "Yes" } else { "No" }
}

/// Numeric projections of a canonical record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NumericField {
    Tenure,
    MonthlyCharge,
    TotalCharge,
    /// 0/1 encoding of the senior-citizen flag.
    SeniorCitizen,
    /// 0/1 encoding of the churn flag.
    Churn,
}

impl NumericField {
    /// All projections, in the default correlation order.
    pub const ALL: [NumericField; 5] = [
        NumericField::Tenure,
        NumericField::MonthlyCharge,
        NumericField::TotalCharge,
        NumericField::SeniorCitizen,
        NumericField::Churn,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            NumericField::Tenure => "tenure",
            NumericField::MonthlyCharge => "monthlyCharge",
            NumericField::TotalCharge => "totalCharge",
            NumericField::SeniorCitizen => "seniorCitizen",
            NumericField::Churn => "churn",
        }
    }
}

impl fmt::Display for NumericField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NumericField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "tenure" | "tenuremonths" => Ok(NumericField::Tenure),
            "monthlycharge" | "monthlycharges" | "monthly" => Ok(NumericField::MonthlyCharge),
            "totalcharge" | "totalcharges" | "total" => Ok(NumericField::TotalCharge),
            "seniorcitizen" | "senior" => Ok(NumericField::SeniorCitizen),
            "churn" | "churned" => Ok(NumericField::Churn),
            _ => Err(format!("unknown numeric field '{}'", s)),
        }
    }
}

/// Every field of a canonical record, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CanonicalField {
    CustomerId,
    Churned,
    Gender,
    SeniorCitizen,
    HasPartner,
    HasDependents,
    TenureMonths,
    PhoneService,
    MultipleLines,
    InternetService,
    OnlineSecurity,
    OnlineBackup,
    DeviceProtection,
    TechSupport,
    StreamingTv,
    StreamingMovies,
    Contract,
    PaperlessBilling,
    PaymentMethod,
    MonthlyCharge,
    TotalCharge,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 21] = [
        CanonicalField::CustomerId,
        CanonicalField::Churned,
        CanonicalField::Gender,
        CanonicalField::SeniorCitizen,
        CanonicalField::HasPartner,
        CanonicalField::HasDependents,
        CanonicalField::TenureMonths,
        CanonicalField::PhoneService,
        CanonicalField::MultipleLines,
        CanonicalField::InternetService,
        CanonicalField::OnlineSecurity,
        CanonicalField::OnlineBackup,
        CanonicalField::DeviceProtection,
        CanonicalField::TechSupport,
        CanonicalField::StreamingTv,
        CanonicalField::StreamingMovies,
        CanonicalField::Contract,
        CanonicalField::PaperlessBilling,
        CanonicalField::PaymentMethod,
        CanonicalField::MonthlyCharge,
        CanonicalField::TotalCharge,
    ];

    /// Dotted path of the field inside a serialized canonical record.
    pub fn path(&self) -> &'static str {
        match self {
            CanonicalField::CustomerId => "customerId",
            CanonicalField::Churned => "churned",
            CanonicalField::Gender => "demographics.gender",
            CanonicalField::SeniorCitizen => "demographics.seniorCitizen",
            CanonicalField::HasPartner => "demographics.hasPartner",
            CanonicalField::HasDependents => "demographics.hasDependents",
            CanonicalField::TenureMonths => "demographics.tenureMonths",
            CanonicalField::PhoneService => "services.phoneService",
            CanonicalField::MultipleLines => "services.multipleLines",
            CanonicalField::InternetService => "services.internetService",
            CanonicalField::OnlineSecurity => "services.onlineSecurity",
            CanonicalField::OnlineBackup => "services.onlineBackup",
            CanonicalField::DeviceProtection => "services.deviceProtection",
            CanonicalField::TechSupport => "services.techSupport",
            CanonicalField::StreamingTv => "services.streamingTv",
            CanonicalField::StreamingMovies => "services.streamingMovies",
            CanonicalField::Contract => "billing.contract",
            CanonicalField::PaperlessBilling => "billing.paperlessBilling",
            CanonicalField::PaymentMethod => "billing.paymentMethod",
            CanonicalField::MonthlyCharge => "billing.monthlyCharge",
            CanonicalField::TotalCharge => "billing.totalCharge",
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_projection() {
        let mut record = CanonicalRecord::new("C1", true);
        record.demographics.tenure_months = 12;
        record.demographics.senior_citizen = true;
        record.billing.monthly_charge = 70.5;
        record.billing.total_charge = 846.0;

        assert_eq!(record.numeric(NumericField::Tenure), 12.0);
        assert_eq!(record.numeric(NumericField::MonthlyCharge), 70.5);
        assert_eq!(record.numeric(NumericField::TotalCharge), 846.0);
        assert_eq!(record.numeric(NumericField::SeniorCitizen), 1.0);
        assert_eq!(record.numeric(NumericField::Churn), 1.0);
    }

    #[test]
    fn test_flat_row_column_order() {
        let record = CanonicalRecord::new("C1", false);
        let row = record.to_flat_row();

        assert_eq!(row.len(), 21);
        assert_eq!(row.keys().next().map(String::as_str), Some("customerID"));
        assert_eq!(row["Churn"], json!("No"));
        assert_eq!(row.keys().last().map(String::as_str), Some("TotalCharges"));
    }

    #[test]
    fn test_numeric_field_from_str() {
        assert_eq!("MonthlyCharges".parse::<NumericField>(), Ok(NumericField::MonthlyCharge));
        assert_eq!("tenure".parse::<NumericField>(), Ok(NumericField::Tenure));
        assert_eq!("total_charges".parse::<NumericField>(), Ok(NumericField::TotalCharge));
        assert!("bogus".parse::<NumericField>().is_err());
    }

    #[test]
    fn test_serialized_paths_match_field_paths() {
        let value = serde_json::to_value(CanonicalRecord::new("C1", false)).unwrap();
        for field in CanonicalField::ALL {
            let found = field
                .path()
                .split('.')
                .try_fold(&value, |v, key| v.get(key));
            assert!(found.is_some(), "missing path {}", field.path());
        }
    }
}
