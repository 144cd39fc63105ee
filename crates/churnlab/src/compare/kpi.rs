//! Per-dataset KPIs and the deltas between two KPI sets.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schema::{CanonicalRecord, ContractType};
use crate::stats::{mean, percentage, round_to};

/// Summary KPIs of one dataset. Rates are percentages.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpis {
    pub customer_count: usize,
    pub churn_count: usize,
    pub churn_rate: f64,
    pub retention_rate: f64,
    /// Rounded to 1 decimal.
    pub avg_tenure: f64,
    pub avg_monthly: f64,
    pub avg_total: f64,
    pub senior_count: usize,
    pub senior_rate: f64,
    pub month_to_month_count: usize,
    pub month_to_month_rate: f64,
    /// Sum of monthly charges.
    pub total_revenue: f64,
}

impl Kpis {
    /// Compute KPIs; every figure is 0 for an empty dataset.
    pub fn compute(records: &[CanonicalRecord]) -> Self {
        let n = records.len();
        let churn_count = records.iter().filter(|r| r.churned).count();
        let senior_count = records.iter().filter(|r| r.demographics.senior_citizen).count();
        let month_to_month_count = records
            .iter()
            .filter(|r| r.billing.contract == ContractType::MonthToMonth)
            .count();

        let tenure: Vec<f64> = records
            .iter()
            .map(|r| f64::from(r.demographics.tenure_months))
            .collect();
        let monthly: Vec<f64> = records.iter().map(|r| r.billing.monthly_charge).collect();
        let total: Vec<f64> = records.iter().map(|r| r.billing.total_charge).collect();

        let churn_rate = percentage(churn_count, n);
        let retention_rate = if n == 0 { 0.0 } else { 100.0 - churn_rate };

        Self {
            customer_count: n,
            churn_count,
            churn_rate: round_to(churn_rate, 2),
            retention_rate: round_to(retention_rate, 2),
            avg_tenure: round_to(mean(&tenure), 1),
            avg_monthly: round_to(mean(&monthly), 2),
            avg_total: round_to(mean(&total), 2),
            senior_count,
            senior_rate: round_to(percentage(senior_count, n), 2),
            month_to_month_count,
            month_to_month_rate: round_to(percentage(month_to_month_count, n), 2),
            total_revenue: round_to(monthly.iter().sum(), 2),
        }
    }

    pub fn get(&self, metric: KpiMetric) -> f64 {
        match metric {
            KpiMetric::CustomerCount => self.customer_count as f64,
            KpiMetric::ChurnCount => self.churn_count as f64,
            KpiMetric::ChurnRate => self.churn_rate,
            KpiMetric::RetentionRate => self.retention_rate,
            KpiMetric::AvgTenure => self.avg_tenure,
            KpiMetric::AvgMonthly => self.avg_monthly,
            KpiMetric::AvgTotal => self.avg_total,
            KpiMetric::SeniorCount => self.senior_count as f64,
            KpiMetric::SeniorRate => self.senior_rate,
            KpiMetric::MonthToMonthCount => self.month_to_month_count as f64,
            KpiMetric::MonthToMonthRate => self.month_to_month_rate,
            KpiMetric::TotalRevenue => self.total_revenue,
        }
    }
}

/// Names of the KPIs in [`Kpis`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KpiMetric {
    CustomerCount,
    ChurnCount,
    ChurnRate,
    RetentionRate,
    AvgTenure,
    AvgMonthly,
    AvgTotal,
    SeniorCount,
    SeniorRate,
    MonthToMonthCount,
    MonthToMonthRate,
    TotalRevenue,
}

impl KpiMetric {
    pub const ALL: [KpiMetric; 12] = [
        KpiMetric::CustomerCount,
        KpiMetric::ChurnCount,
        KpiMetric::ChurnRate,
        KpiMetric::RetentionRate,
        KpiMetric::AvgTenure,
        KpiMetric::AvgMonthly,
        KpiMetric::AvgTotal,
        KpiMetric::SeniorCount,
        KpiMetric::SeniorRate,
        KpiMetric::MonthToMonthCount,
        KpiMetric::MonthToMonthRate,
        KpiMetric::TotalRevenue,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            KpiMetric::CustomerCount => "customerCount",
            KpiMetric::ChurnCount => "churnCount",
            KpiMetric::ChurnRate => "churnRate",
            KpiMetric::RetentionRate => "retentionRate",
            KpiMetric::AvgTenure => "avgTenure",
            KpiMetric::AvgMonthly => "avgMonthly",
            KpiMetric::AvgTotal => "avgTotal",
            KpiMetric::SeniorCount => "seniorCount",
            KpiMetric::SeniorRate => "seniorRate",
            KpiMetric::MonthToMonthCount => "monthToMonthCount",
            KpiMetric::MonthToMonthRate => "monthToMonthRate",
            KpiMetric::TotalRevenue => "totalRevenue",
        }
    }
}

impl fmt::Display for KpiMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sign of a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Increase,
    Decrease,
    Same,
}

/// Change of one KPI from a base dataset to another.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KpiDelta {
    /// `other - base`, rounded to 2 decimals.
    pub absolute: f64,
    /// Relative to the base, rounded to 2 decimals; 0 when the base is 0.
    pub percentage: f64,
    pub direction: Direction,
}

impl KpiDelta {
    pub fn between(base: f64, other: f64) -> Self {
        let absolute = other - base;
        let percentage = if base == 0.0 { 0.0 } else { absolute / base * 100.0 };
        let direction = if absolute > 0.0 {
            Direction::Increase
        } else if absolute < 0.0 {
            Direction::Decrease
        } else {
            Direction::Same
        };
        Self {
            absolute: round_to(absolute, 2),
            percentage: round_to(percentage, 2),
            direction,
        }
    }
}
