//! Rule-based insight generation for a single dataset.
//!
//! Each rule looks at one slice of the customer base and emits at most one
//! insight (the contract rule may emit two). Rules whose population is empty
//! are skipped. Thresholds come from [`InsightRules`].

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::schema::{CanonicalRecord, ContractType, InternetServiceType};
use crate::stats::{percentage, round_to};

use super::insight::{Impact, Insight, InsightCategory, InsightSeverity, sort_by_severity};
use super::rules::InsightRules;

/// Customers and churners in one slice of the dataset.
#[derive(Debug, Clone, Copy, Default)]
struct Rate {
    total: usize,
    churned: usize,
}

impl Rate {
    fn add(&mut self, churned: bool) {
        self.total += 1;
        if churned {
            self.churned += 1;
        }
    }

    /// Churn percentage; `None` for an empty slice.
    fn rate(&self) -> Option<f64> {
        (self.total > 0).then(|| percentage(self.churned, self.total))
    }
}

/// Counts gathered in one pass over the dataset.
#[derive(Debug, Default)]
struct Tally {
    all: Rate,
    month_to_month: Rate,
    high_value: Rate,
    low_value_retained: usize,
    new_customers: Rate,
    senior: Rate,
    non_senior: Rate,
    fiber: Rate,
    dsl: Rate,
    payment: IndexMap<String, Rate>,
    at_risk: usize,
}

impl Tally {
    fn collect(records: &[CanonicalRecord], rules: &InsightRules) -> Self {
        let mut tally = Tally::default();
        for r in records {
            let churned = r.churned;
            let tenure = r.demographics.tenure_months;
            let monthly = r.billing.monthly_charge;
            let month_to_month = r.billing.contract == ContractType::MonthToMonth;

            tally.all.add(churned);
            if month_to_month {
                tally.month_to_month.add(churned);
                if tenure < rules.at_risk_tenure && !churned {
                    tally.at_risk += 1;
                }
            }
            if monthly > rules.high_value_monthly {
                tally.high_value.add(churned);
            }
            if monthly < rules.low_value_monthly && !churned {
                tally.low_value_retained += 1;
            }
            if tenure < rules.new_customer_tenure {
                tally.new_customers.add(churned);
            }
            if r.demographics.senior_citizen {
                tally.senior.add(churned);
            } else {
                tally.non_senior.add(churned);
            }
            match r.services.internet_service {
                InternetServiceType::FiberOptic => tally.fiber.add(churned),
                InternetServiceType::Dsl => tally.dsl.add(churned),
                _ => {}
            }
            let method = r.billing.payment_method.trim();
            if !method.is_empty() {
                tally.payment.entry(method.to_string()).or_default().add(churned);
            }
        }
        tally
    }
}

/// Runs the single-dataset heuristics.
#[derive(Debug, Clone, Default)]
pub struct InsightsGenerator {
    rules: InsightRules,
}

impl InsightsGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: InsightRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &InsightRules {
        &self.rules
    }

    /// Evaluate every rule and return the insights, most severe first.
    pub fn generate(&self, records: &[CanonicalRecord]) -> Vec<Insight> {
        if records.is_empty() {
            debug!("no records, skipping insight rules");
            return Vec::new();
        }

        let tally = Tally::collect(records, &self.rules);
        let mut insights = Vec::new();

        self.churn_tier(&tally, &mut insights);
        self.contracts(&tally, &mut insights);
        self.high_value_loss(&tally, &mut insights);
        self.upsell(&tally, &mut insights);
        self.early_tenure(&tally, &mut insights);
        self.seniors(&tally, &mut insights);
        self.internet_service(&tally, &mut insights);
        self.payment_methods(&tally, &mut insights);
        self.at_risk_segment(&tally, &mut insights);

        sort_by_severity(&mut insights);
        info!(
            records = records.len(),
            insights = insights.len(),
            "generated insights"
        );
        insights
    }

    // =========================================================================
    // RULES
    // =========================================================================

    fn churn_tier(&self, tally: &Tally, out: &mut Vec<Insight>) {
        let Some(rate) = tally.all.rate() else { return };
        let rules = &self.rules;

        let insight = if rate > rules.churn_critical {
            Insight::new(
                InsightSeverity::Critical,
                InsightCategory::Churn,
                "Critical Churn Rate",
                format!(
                    "Churn rate is {:.1}%, significantly above industry average (15-20%)",
                    rate
                ),
            )
            .with_impact(Impact::High)
            .with_recommendation(
                "Immediate action required: review customer satisfaction, service quality and pricing strategy",
            )
            .with_actions(&[
                "Conduct customer satisfaction survey",
                "Implement retention program",
                "Review pricing vs competitors",
                "Improve customer support",
            ])
            .with_metric("current", round_to(rate, 2))
            .with_metric("target", rules.churn_target)
            .with_metric("customersAtRisk", tally.all.churned)
        } else if rate > rules.churn_warning {
            Insight::new(
                InsightSeverity::Warning,
                InsightCategory::Churn,
                "Elevated Churn Rate",
                format!("Churn rate is {:.1}%, above recommended level", rate),
            )
            .with_impact(Impact::Medium)
            .with_recommendation("Monitor closely and implement preventive measures")
            .with_actions(&[
                "Analyze churn reasons",
                "Strengthen customer relationships",
                "Offer incentives for loyalty",
            ])
            .with_metric("current", round_to(rate, 2))
        } else {
            Insight::new(
                InsightSeverity::Opportunity,
                InsightCategory::Churn,
                "Healthy Churn Rate",
                format!("Churn rate is {:.1}%, within healthy range", rate),
            )
            .with_recommendation("Maintain current retention strategies and continue monitoring")
            .with_metric("current", round_to(rate, 2))
        };
        out.push(insight);
    }

    fn contracts(&self, tally: &Tally, out: &mut Vec<Insight>) {
        let rules = &self.rules;

        let churning = tally.month_to_month.rate().filter(|&r| r > rules.month_to_month_churn);
        if let Some(rate) = churning {
            let convertible = (tally.month_to_month.churned as f64 * rules.contract_conversion).floor();
            out.push(
                Insight::new(
                    InsightSeverity::Critical,
                    InsightCategory::Contracts,
                    "Month-to-Month High Churn",
                    format!("{:.1}% of month-to-month customers are churning", rate),
                )
                .with_impact(Impact::High)
                .with_recommendation("Aggressive campaign to convert to longer contracts")
                .with_actions(&[
                    "Offer discounts for 1-year contracts",
                    "Create loyalty rewards program",
                    "Provide contract upgrade incentives",
                ])
                .with_metric("churnRate", round_to(rate, 2))
                .with_metric("potentialSavings", convertible as u64),
            );
        }

        let share = percentage(tally.month_to_month.total, tally.all.total);
        if share > rules.month_to_month_share {
            out.push(
                Insight::new(
                    InsightSeverity::Warning,
                    InsightCategory::Contracts,
                    "Too Many Month-to-Month Contracts",
                    format!("{:.1}% of customers are on month-to-month contracts", share),
                )
                .with_impact(Impact::Medium)
                .with_recommendation("Incentivize longer contract commitments")
                .with_actions(&[
                    "Launch contract conversion campaign",
                    "Offer first-month discount for upgrades",
                    "Bundle services with longer contracts",
                ])
                .with_metric("share", round_to(share, 2)),
            );
        }
    }

    fn high_value_loss(&self, tally: &Tally, out: &mut Vec<Insight>) {
        let rules = &self.rules;
        let Some(rate) = tally.high_value.rate() else { return };
        if rate <= rules.high_value_churn {
            return;
        }

        let lost = tally.high_value.churned;
        let annual_loss = lost as f64 * rules.high_value_monthly * rules.revenue_months;
        out.push(
            Insight::new(
                InsightSeverity::Critical,
                InsightCategory::Revenue,
                "High-Value Customer Loss",
                format!(
                    "{} high-value customers (>${:.0}/mo) are churning",
                    lost, rules.high_value_monthly
                ),
            )
            .with_impact(Impact::High)
            .with_recommendation("Priority retention program for high-value customers")
            .with_actions(&[
                "Assign dedicated account managers",
                "Offer premium support",
                "Create VIP loyalty program",
                "Proactive engagement calls",
            ])
            .with_metric("customersLost", lost)
            .with_metric("churnRate", round_to(rate, 2))
            .with_metric("estimatedAnnualLoss", round_to(annual_loss, 2)),
        );
    }

    fn upsell(&self, tally: &Tally, out: &mut Vec<Insight>) {
        let rules = &self.rules;
        let candidates = tally.low_value_retained;
        if (candidates as f64) <= tally.all.total as f64 * rules.upsell_share {
            return;
        }

        let potential = candidates as f64 * rules.upsell_uplift * rules.revenue_months;
        out.push(
            Insight::new(
                InsightSeverity::Opportunity,
                InsightCategory::Revenue,
                "Upsell Opportunity",
                format!("{} low-value customers with upsell potential", candidates),
            )
            .with_impact(Impact::Medium)
            .with_recommendation("Launch targeted upsell campaign")
            .with_actions(&[
                "Offer service bundle upgrades",
                "Promote premium features",
                "Time-limited upgrade offers",
            ])
            .with_metric("customers", candidates)
            .with_metric("potentialAnnualRevenue", round_to(potential, 2)),
        );
    }

    fn early_tenure(&self, tally: &Tally, out: &mut Vec<Insight>) {
        let rules = &self.rules;
        let Some(rate) = tally.new_customers.rate() else { return };
        if rate <= rules.early_churn {
            return;
        }

        out.push(
            Insight::new(
                InsightSeverity::Warning,
                InsightCategory::Onboarding,
                "High Early-Stage Churn",
                format!(
                    "{:.1}% of customers churn within first {} months",
                    rate, rules.new_customer_tenure
                ),
            )
            .with_impact(Impact::High)
            .with_recommendation("Improve onboarding and early customer experience")
            .with_actions(&[
                "Enhanced onboarding program",
                "First-month check-in calls",
                "Welcome incentives",
                "Satisfaction surveys at 30, 60, 90 days",
            ])
            .with_metric("churnRate", round_to(rate, 2))
            .with_metric("customers", tally.new_customers.total),
        );
    }

    fn seniors(&self, tally: &Tally, out: &mut Vec<Insight>) {
        let (Some(senior), Some(other)) = (tally.senior.rate(), tally.non_senior.rate()) else {
            return;
        };
        if senior <= other * self.rules.senior_churn_ratio {
            return;
        }

        out.push(
            Insight::new(
                InsightSeverity::Warning,
                InsightCategory::Demographics,
                "Senior Citizens Higher Churn",
                format!(
                    "Senior citizens have {:.1}% higher churn rate",
                    senior - other
                ),
            )
            .with_impact(Impact::Medium)
            .with_recommendation("Develop senior-friendly programs and support")
            .with_actions(&[
                "Simplified billing options",
                "Enhanced customer support",
                "Senior discount programs",
                "Easy-to-use interfaces",
            ])
            .with_metric("seniorChurnRate", round_to(senior, 2))
            .with_metric("nonSeniorChurnRate", round_to(other, 2)),
        );
    }

    fn internet_service(&self, tally: &Tally, out: &mut Vec<Insight>) {
        let (Some(fiber), Some(dsl)) = (tally.fiber.rate(), tally.dsl.rate()) else {
            return;
        };
        if fiber <= dsl * self.rules.fiber_churn_ratio {
            return;
        }

        out.push(
            Insight::new(
                InsightSeverity::Warning,
                InsightCategory::Services,
                "Fiber Optic Service Issues",
                format!("Fiber optic customers have {:.1}% higher churn", fiber - dsl),
            )
            .with_impact(Impact::Medium)
            .with_recommendation("Investigate fiber service quality and pricing")
            .with_actions(&[
                "Review fiber pricing competitiveness",
                "Assess service quality metrics",
                "Customer satisfaction survey",
                "Technical support review",
            ])
            .with_metric("fiberChurnRate", round_to(fiber, 2))
            .with_metric("dslChurnRate", round_to(dsl, 2)),
        );
    }

    fn payment_methods(&self, tally: &Tally, out: &mut Vec<Insight>) {
        // Strictly greater keeps the first-seen method on ties.
        let mut highest: Option<(&str, f64)> = None;
        for (method, rate) in &tally.payment {
            let Some(r) = rate.rate() else { continue };
            if highest.is_none_or(|(_, top)| r > top) {
                highest = Some((method.as_str(), r));
            }
        }

        let Some((method, rate)) = highest else { return };
        if rate <= self.rules.payment_churn {
            return;
        }

        out.push(
            Insight::new(
                InsightSeverity::Info,
                InsightCategory::Payments,
                "Payment Method Correlation",
                format!("Customers using {} have {:.1}% churn rate", method, rate),
            )
            .with_recommendation("Consider payment method incentives or improvements")
            .with_metric("paymentMethod", method)
            .with_metric("churnRate", round_to(rate, 2)),
        );
    }

    fn at_risk_segment(&self, tally: &Tally, out: &mut Vec<Insight>) {
        if tally.at_risk == 0 {
            return;
        }

        out.push(
            Insight::new(
                InsightSeverity::Opportunity,
                InsightCategory::Prevention,
                "High-Risk Customer Segment",
                format!("{} customers at high risk of churning", tally.at_risk),
            )
            .with_impact(Impact::High)
            .with_recommendation("Proactive retention campaign for at-risk customers")
            .with_actions(&[
                "Offer contract upgrade incentives",
                "Personalized engagement calls",
                "Special loyalty discounts",
                "Service satisfaction check-ins",
            ])
            .with_metric("targetCustomers", tally.at_risk),
        );
    }
}
