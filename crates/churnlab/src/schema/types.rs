//! Enumerated value types used by canonical records.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Internet service subscribed to by a customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InternetServiceType {
    /// Digital subscriber line.
    Dsl,
    /// Fiber optic.
    FiberOptic,
    /// No internet service.
    None,
    /// Not present in the source data.
    #[default]
    Unspecified,
}

impl InternetServiceType {
    /// Lenient parse from a source value; unrecognized text maps to `Unspecified`.
    pub fn parse(value: &str) -> Self {
        match squash(value).as_str() {
            "dsl" => InternetServiceType::Dsl,
            "fiberoptic" | "fiber" | "fibre" | "fibreoptic" => InternetServiceType::FiberOptic,
            "no" | "none" | "0" | "false" | "nointernetservice" => InternetServiceType::None,
            _ => InternetServiceType::Unspecified,
        }
    }

    /// Source-style label ("DSL", "Fiber optic", "No"); empty when unspecified.
    pub fn label(&self) -> &'static str {
        match self {
            InternetServiceType::Dsl => "DSL",
            InternetServiceType::FiberOptic => "Fiber optic",
            InternetServiceType::None => "No",
            InternetServiceType::Unspecified => "",
        }
    }
}

/// Tri-state flag for optional add-on services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceFlag {
    Yes,
    #[default]
    No,
    /// The base service the flag depends on is absent (e.g. "No internet service").
    NotApplicable,
}

impl ServiceFlag {
    /// Lenient parse from a source value.
    pub fn parse(value: &str) -> Self {
        let squashed = squash(value);
        match squashed.as_str() {
            "yes" | "1" | "true" | "y" => ServiceFlag::Yes,
            "na" | "notapplicable" => ServiceFlag::NotApplicable,
            s if s.starts_with("no") && s.ends_with("service") => ServiceFlag::NotApplicable,
            _ => ServiceFlag::No,
        }
    }

    /// Source-style label.
    pub fn label(&self) -> &'static str {
        match self {
            ServiceFlag::Yes => "Yes",
            ServiceFlag::No => "No",
            ServiceFlag::NotApplicable => "Not applicable",
        }
    }

    pub fn is_yes(&self) -> bool {
        matches!(self, ServiceFlag::Yes)
    }
}

/// Billing contract length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractType {
    MonthToMonth,
    OneYear,
    TwoYear,
    /// Not present in the source data.
    #[default]
    Unspecified,
}

impl ContractType {
    /// Lenient parse from a source value; unrecognized text maps to `Unspecified`.
    pub fn parse(value: &str) -> Self {
        match squash(value).as_str() {
            "monthtomonth" | "monthly" | "month" | "m2m" => ContractType::MonthToMonth,
            "oneyear" | "1year" | "12months" | "annual" | "yearly" => ContractType::OneYear,
            "twoyear" | "2year" | "24months" | "twoyears" | "2years" => ContractType::TwoYear,
            _ => ContractType::Unspecified,
        }
    }

    /// Source-style label ("Month-to-month", "One year", "Two year"); empty when unspecified.
    pub fn label(&self) -> &'static str {
        match self {
            ContractType::MonthToMonth => "Month-to-month",
            ContractType::OneYear => "One year",
            ContractType::TwoYear => "Two year",
            ContractType::Unspecified => "",
        }
    }
}

impl fmt::Display for InternetServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for ServiceFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for ContractType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lowercase and drop everything except ASCII alphanumerics.
fn squash(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_variants() {
        assert_eq!(ContractType::parse("Month-to-month"), ContractType::MonthToMonth);
        assert_eq!(ContractType::parse("month_to_month"), ContractType::MonthToMonth);
        assert_eq!(ContractType::parse("One year"), ContractType::OneYear);
        assert_eq!(ContractType::parse("TWO YEAR"), ContractType::TwoYear);
        assert_eq!(ContractType::parse("lifetime"), ContractType::Unspecified);
    }

    #[test]
    fn test_internet_variants() {
        assert_eq!(InternetServiceType::parse("Fiber optic"), InternetServiceType::FiberOptic);
        assert_eq!(InternetServiceType::parse("dsl"), InternetServiceType::Dsl);
        assert_eq!(InternetServiceType::parse("No"), InternetServiceType::None);
        assert_eq!(InternetServiceType::parse(""), InternetServiceType::Unspecified);
    }

    #[test]
    fn test_service_flag_variants() {
        assert_eq!(ServiceFlag::parse("Yes"), ServiceFlag::Yes);
        assert_eq!(ServiceFlag::parse("No internet service"), ServiceFlag::NotApplicable);
        assert_eq!(ServiceFlag::parse("No phone service"), ServiceFlag::NotApplicable);
        assert_eq!(ServiceFlag::parse("no"), ServiceFlag::No);
        assert_eq!(ServiceFlag::parse("garbage"), ServiceFlag::No);
    }
}
