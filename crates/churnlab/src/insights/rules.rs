//! Thresholds used by the insight rules.
//!
//! All percentages are on a 0-100 scale; charges are monthly amounts.

use serde::{Deserialize, Serialize};

pub const DEFAULT_CHURN_CRITICAL: f64 = 30.0;
pub const DEFAULT_CHURN_WARNING: f64 = 20.0;
pub const DEFAULT_MONTH_TO_MONTH_CHURN: f64 = 40.0;
pub const DEFAULT_MONTH_TO_MONTH_SHARE: f64 = 50.0;
pub const DEFAULT_CONTRACT_CONVERSION: f64 = 0.5;
pub const DEFAULT_HIGH_VALUE_MONTHLY: f64 = 80.0;
pub const DEFAULT_HIGH_VALUE_CHURN: f64 = 20.0;
pub const DEFAULT_LOW_VALUE_MONTHLY: f64 = 40.0;
pub const DEFAULT_UPSELL_SHARE: f64 = 0.30;
pub const DEFAULT_NEW_CUSTOMER_TENURE: u32 = 6;
pub const DEFAULT_EARLY_CHURN: f64 = 30.0;
pub const DEFAULT_SENIOR_CHURN_RATIO: f64 = 1.5;
pub const DEFAULT_FIBER_CHURN_RATIO: f64 = 1.3;
pub const DEFAULT_PAYMENT_CHURN: f64 = 35.0;
pub const DEFAULT_AT_RISK_TENURE: u32 = 12;
pub const DEFAULT_REVENUE_MONTHS: f64 = 12.0;
pub const DEFAULT_UPSELL_UPLIFT: f64 = 20.0;
/// Churn rate the critical-tier insight sets as a target.
pub const DEFAULT_CHURN_TARGET: f64 = 20.0;

/// Overridable thresholds for [`InsightsGenerator`](super::InsightsGenerator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightRules {
    /// Churn rate above which the dataset is in critical shape.
    pub churn_critical: f64,
    /// Churn rate above which the dataset is elevated.
    pub churn_warning: f64,
    pub churn_target: f64,
    /// Churn rate among month-to-month customers considered critical.
    pub month_to_month_churn: f64,
    /// Share of month-to-month contracts considered too high.
    pub month_to_month_share: f64,
    /// Fraction of churning month-to-month customers assumed convertible.
    pub contract_conversion: f64,
    pub high_value_monthly: f64,
    pub high_value_churn: f64,
    pub low_value_monthly: f64,
    /// Fraction (0-1) of the base that must be low-value retained customers.
    pub upsell_share: f64,
    /// Tenure in months below which a customer is new.
    pub new_customer_tenure: u32,
    pub early_churn: f64,
    /// Senior churn rate must exceed the non-senior rate times this.
    pub senior_churn_ratio: f64,
    /// Fiber churn rate must exceed the DSL rate times this.
    pub fiber_churn_ratio: f64,
    pub payment_churn: f64,
    pub at_risk_tenure: u32,
    /// Months used to annualize monthly amounts.
    pub revenue_months: f64,
    /// Assumed monthly uplift per upsold customer.
    pub upsell_uplift: f64,
}

impl Default for InsightRules {
    fn default() -> Self {
        Self {
            churn_critical: DEFAULT_CHURN_CRITICAL,
            churn_warning: DEFAULT_CHURN_WARNING,
            churn_target: DEFAULT_CHURN_TARGET,
            month_to_month_churn: DEFAULT_MONTH_TO_MONTH_CHURN,
            month_to_month_share: DEFAULT_MONTH_TO_MONTH_SHARE,
            contract_conversion: DEFAULT_CONTRACT_CONVERSION,
            high_value_monthly: DEFAULT_HIGH_VALUE_MONTHLY,
            high_value_churn: DEFAULT_HIGH_VALUE_CHURN,
            low_value_monthly: DEFAULT_LOW_VALUE_MONTHLY,
            upsell_share: DEFAULT_UPSELL_SHARE,
            new_customer_tenure: DEFAULT_NEW_CUSTOMER_TENURE,
            early_churn: DEFAULT_EARLY_CHURN,
            senior_churn_ratio: DEFAULT_SENIOR_CHURN_RATIO,
            fiber_churn_ratio: DEFAULT_FIBER_CHURN_RATIO,
            payment_churn: DEFAULT_PAYMENT_CHURN,
            at_risk_tenure: DEFAULT_AT_RISK_TENURE,
            revenue_months: DEFAULT_REVENUE_MONTHS,
            upsell_uplift: DEFAULT_UPSELL_UPLIFT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_takes_defaults() {
        let rules: InsightRules = serde_json::from_str(r#"{"churn_critical": 25.0}"#).unwrap();
        assert_eq!(rules.churn_critical, 25.0);
        assert_eq!(rules.churn_warning, DEFAULT_CHURN_WARNING);
        assert_eq!(rules.new_customer_tenure, 6);
    }
}
