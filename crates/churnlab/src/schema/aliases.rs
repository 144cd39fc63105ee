//! Declarative alias table mapping canonical fields to source field names.
//!
//! Each canonical field owns two ordered lists:
//!
//! - `flat`: top-level column names (case and snake/camel variants).
//! - `grouped`: dotted paths under a grouping key (`customer.tenure`,
//!   `account.Charges.Monthly`). Nested records walk these paths through
//!   sub-objects; prefixed records look them up as literal keys.
//!
//! The resolution order for a structure is produced by [`FieldAliases::for_structure`].

use indexmap::IndexMap;
use once_cell::sync::Lazy;

use crate::input::RecordStructure;

use super::record::CanonicalField;

/// Top-level keys that group related fields in nested records.
pub const GROUPING_KEYS: &[&str] = &["customer", "phone", "internet", "account"];

/// Ordered alias lists for one canonical field.
#[derive(Debug, Clone)]
pub struct FieldAliases {
    pub flat: Vec<&'static str>,
    pub grouped: Vec<&'static str>,
}

impl FieldAliases {
    /// Aliases to probe, in order, for the given structure.
    ///
    /// Flat records only see top-level names. Nested and prefixed records try
    /// the grouped paths first and fall back to top-level names, since ids and
    /// churn flags usually sit at the top level in every layout.
    pub fn for_structure(
        &self,
        structure: RecordStructure,
    ) -> impl Iterator<Item = &'static str> + '_ {
        let grouped: &[&'static str] = match structure {
            RecordStructure::Flat => &[],
            RecordStructure::Nested | RecordStructure::Prefixed => &self.grouped,
        };
        grouped.iter().chain(self.flat.iter()).copied()
    }
}

fn entry(flat: &[&'static str], grouped: &[&'static str]) -> FieldAliases {
    FieldAliases {
        flat: flat.to_vec(),
        grouped: grouped.to_vec(),
    }
}

/// The alias table. Insertion order follows [`CanonicalField::ALL`].
pub static FIELD_ALIASES: Lazy<IndexMap<CanonicalField, FieldAliases>> = Lazy::new(|| {
    use CanonicalField::*;

    let mut table = IndexMap::new();
    table.insert(
        CustomerId,
        entry(
            &["customerID", "CustomerID", "customerId", "customer_id", "CUSTOMERID", "CUSTOMER_ID"],
            &["customer.customerID", "customer.customerId", "customer.id"],
        ),
    );
    table.insert(
        Churned,
        entry(
            &["Churn", "churn", "CHURN", "churned", "Churned", "is_churned"],
            &["customer.Churn", "customer.churn", "account.Churn"],
        ),
    );
    table.insert(
        Gender,
        entry(
            &["gender", "Gender", "GENDER", "sex"],
            &["customer.gender", "customer.Gender", "demographics.gender"],
        ),
    );
    table.insert(
        SeniorCitizen,
        entry(
            &["SeniorCitizen", "seniorCitizen", "senior_citizen", "senior", "SENIORCITIZEN"],
            &["customer.SeniorCitizen", "customer.seniorCitizen", "demographics.seniorCitizen"],
        ),
    );
    table.insert(
        HasPartner,
        entry(
            &["Partner", "partner", "PARTNER", "hasPartner", "has_partner"],
            &["customer.Partner", "customer.partner", "demographics.hasPartner"],
        ),
    );
    table.insert(
        HasDependents,
        entry(
            &["Dependents", "dependents", "DEPENDENTS", "hasDependents", "has_dependents"],
            &["customer.Dependents", "customer.dependents", "demographics.hasDependents"],
        ),
    );
    table.insert(
        TenureMonths,
        entry(
            &["tenure", "Tenure", "TENURE", "tenureMonths", "tenure_months"],
            &["customer.tenure", "customer.Tenure", "demographics.tenureMonths"],
        ),
    );
    table.insert(
        PhoneService,
        entry(
            &["PhoneService", "phoneService", "phone_service", "PHONESERVICE"],
            &["phone.PhoneService", "phone.phoneService", "services.phoneService"],
        ),
    );
    table.insert(
        MultipleLines,
        entry(
            &["MultipleLines", "multipleLines", "multiple_lines", "MULTIPLELINES"],
            &["phone.MultipleLines", "phone.multipleLines", "services.multipleLines"],
        ),
    );
    table.insert(
        InternetService,
        entry(
            &["InternetService", "internetService", "internet_service", "INTERNETSERVICE"],
            &["internet.InternetService", "internet.internetService", "services.internetService"],
        ),
    );
    table.insert(
        OnlineSecurity,
        entry(
            &["OnlineSecurity", "onlineSecurity", "online_security"],
            &["internet.OnlineSecurity", "internet.onlineSecurity", "services.onlineSecurity"],
        ),
    );
    table.insert(
        OnlineBackup,
        entry(
            &["OnlineBackup", "onlineBackup", "online_backup"],
            &["internet.OnlineBackup", "internet.onlineBackup", "services.onlineBackup"],
        ),
    );
    table.insert(
        DeviceProtection,
        entry(
            &["DeviceProtection", "deviceProtection", "device_protection"],
            &["internet.DeviceProtection", "internet.deviceProtection", "services.deviceProtection"],
        ),
    );
    table.insert(
        TechSupport,
        entry(
            &["TechSupport", "techSupport", "tech_support"],
            &["internet.TechSupport", "internet.techSupport", "services.techSupport"],
        ),
    );
    table.insert(
        StreamingTv,
        entry(
            &["StreamingTV", "streamingTV", "streamingTv", "streaming_tv"],
            &["internet.StreamingTV", "internet.streamingTV", "services.streamingTv"],
        ),
    );
    table.insert(
        StreamingMovies,
        entry(
            &["StreamingMovies", "streamingMovies", "streaming_movies"],
            &["internet.StreamingMovies", "internet.streamingMovies", "services.streamingMovies"],
        ),
    );
    table.insert(
        Contract,
        entry(
            &["Contract", "contract", "CONTRACT", "contractType", "contract_type"],
            &["account.Contract", "account.contract", "billing.contract"],
        ),
    );
    table.insert(
        PaperlessBilling,
        entry(
            &["PaperlessBilling", "paperlessBilling", "paperless_billing"],
            &["account.PaperlessBilling", "account.paperlessBilling", "billing.paperlessBilling"],
        ),
    );
    table.insert(
        PaymentMethod,
        entry(
            &["PaymentMethod", "paymentMethod", "payment_method"],
            &["account.PaymentMethod", "account.paymentMethod", "billing.paymentMethod"],
        ),
    );
    table.insert(
        MonthlyCharge,
        entry(
            &["MonthlyCharges", "monthlyCharges", "monthly_charges", "MonthlyCharge", "monthlyCharge", "monthly"],
            &["account.Charges.Monthly", "account.charges.monthly", "billing.monthlyCharge"],
        ),
    );
    table.insert(
        TotalCharge,
        entry(
            &["TotalCharges", "totalCharges", "total_charges", "TotalCharge", "totalCharge", "total"],
            &["account.Charges.Total", "account.charges.total", "billing.totalCharge"],
        ),
    );
    table
});

/// Alias lists for a canonical field.
pub fn aliases(field: CanonicalField) -> &'static FieldAliases {
    // Every variant is inserted above; the table is exhaustive.
    &FIELD_ALIASES[&field]
}

/// Whether `key` is a known top-level alias of any canonical field.
pub fn is_known_alias(key: &str) -> bool {
    FIELD_ALIASES.values().any(|a| a.flat.contains(&key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_exhaustive() {
        for field in CanonicalField::ALL {
            assert!(FIELD_ALIASES.contains_key(&field), "no aliases for {:?}", field);
        }
        assert_eq!(FIELD_ALIASES.len(), CanonicalField::ALL.len());
    }

    #[test]
    fn test_structure_order() {
        let tenure = aliases(CanonicalField::TenureMonths);
        assert_eq!(tenure.for_structure(RecordStructure::Flat).next(), Some("tenure"));
        assert_eq!(
            tenure.for_structure(RecordStructure::Nested).next(),
            Some("customer.tenure")
        );
        assert!(tenure.for_structure(RecordStructure::Prefixed).any(|a| a == "tenure"));
        assert!(!tenure.for_structure(RecordStructure::Flat).any(|a| a.contains('.')));
    }

    #[test]
    fn test_known_alias() {
        assert!(is_known_alias("customerID"));
        assert!(is_known_alias("MonthlyCharges"));
        assert!(!is_known_alias("favourite_colour"));
    }
}
