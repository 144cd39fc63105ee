//! Pairwise comparison of two or more datasets.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ChurnlabError, Result};
use crate::insights::{Impact, Insight, InsightCategory, InsightSeverity, sort_by_severity};
use crate::schema::CanonicalRecord;
use crate::stats::{SegmentField, mean, percentage, round_to};

use super::kpi::{Direction, KpiDelta, KpiMetric, Kpis};

pub const DEFAULT_CHURN_POINTS: f64 = 5.0;
pub const DEFAULT_CHURN_POINTS_HIGH: f64 = 10.0;
pub const DEFAULT_CUSTOMER_GROWTH_PCT: f64 = 10.0;
pub const DEFAULT_CUSTOMER_GROWTH_PCT_HIGH: f64 = 20.0;
pub const DEFAULT_REVENUE_PCT: f64 = 5.0;

/// Materiality thresholds for pairwise insights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonThresholds {
    /// Churn-rate change in percentage points that produces an insight.
    pub churn_points: f64,
    /// Churn-rate increase above which the insight is critical.
    pub churn_points_high: f64,
    /// Customer-base change (percent) that produces an insight.
    pub customer_growth_pct: f64,
    pub customer_growth_pct_high: f64,
    /// Average monthly charge change (percent) that produces an insight.
    pub revenue_pct: f64,
}

impl Default for ComparisonThresholds {
    fn default() -> Self {
        Self {
            churn_points: DEFAULT_CHURN_POINTS,
            churn_points_high: DEFAULT_CHURN_POINTS_HIGH,
            customer_growth_pct: DEFAULT_CUSTOMER_GROWTH_PCT,
            customer_growth_pct_high: DEFAULT_CUSTOMER_GROWTH_PCT_HIGH,
            revenue_pct: DEFAULT_REVENUE_PCT,
        }
    }
}

/// Count and share of one category value in one dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub count: usize,
    pub percentage: f64,
}

/// Share of a category value in both datasets of a pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDiff {
    pub value: String,
    pub first: CategoryShare,
    pub second: CategoryShare,
    /// Percentage-point change from first to second.
    pub difference: f64,
}

/// Distribution differences for the compared categorical fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionDiff {
    pub contract: Vec<CategoryDiff>,
    pub internet_service: Vec<CategoryDiff>,
    pub gender: Vec<CategoryDiff>,
}

/// Comparison of datasets `first` and `second` (by input position).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairComparison {
    pub first: usize,
    pub second: usize,
    pub first_kpis: Kpis,
    pub second_kpis: Kpis,
    pub deltas: IndexMap<KpiMetric, KpiDelta>,
    pub distributions: DistributionDiff,
    pub insights: Vec<Insight>,
}

impl PairComparison {
    pub fn delta(&self, metric: KpiMetric) -> Option<&KpiDelta> {
        self.deltas.get(&metric)
    }
}

/// Averages over all compared datasets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonSummary {
    pub dataset_count: usize,
    pub total_customers: usize,
    pub avg_churn_rate: f64,
    pub avg_tenure: f64,
    pub avg_monthly: f64,
}

/// Follow-up suggested by the overall trend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub priority: Impact,
    pub category: InsightCategory,
    pub message: String,
    pub actions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub total_datasets: usize,
    pub comparisons: Vec<PairComparison>,
    pub summary: ComparisonSummary,
    pub recommendations: Vec<Recommendation>,
}

/// Compares datasets pairwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComparisonEngine {
    thresholds: ComparisonThresholds,
}

impl ComparisonEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(thresholds: ComparisonThresholds) -> Self {
        Self { thresholds }
    }

    /// Compare every unordered pair `(i, j)`, `i < j`, of the given datasets.
    pub fn compare(&self, datasets: &[Vec<CanonicalRecord>]) -> Result<ComparisonResult> {
        if datasets.len() < 2 {
            return Err(ChurnlabError::InsufficientData {
                required: 2,
                actual: datasets.len(),
            });
        }

        let kpis: Vec<Kpis> = datasets.iter().map(|d| Kpis::compute(d)).collect();

        let mut comparisons = Vec::new();
        for i in 0..datasets.len() {
            for j in (i + 1)..datasets.len() {
                comparisons.push(self.compare_pair(
                    (i, datasets[i].as_slice(), &kpis[i]),
                    (j, datasets[j].as_slice(), &kpis[j]),
                ));
            }
        }

        let recommendations = recommend(&comparisons);
        info!(
            datasets = datasets.len(),
            pairs = comparisons.len(),
            recommendations = recommendations.len(),
            "comparison complete"
        );

        Ok(ComparisonResult {
            total_datasets: datasets.len(),
            summary: summarize(&kpis),
            comparisons,
            recommendations,
        })
    }

    fn compare_pair(
        &self,
        (first, first_records, first_kpis): (usize, &[CanonicalRecord], &Kpis),
        (second, second_records, second_kpis): (usize, &[CanonicalRecord], &Kpis),
    ) -> PairComparison {
        let deltas: IndexMap<KpiMetric, KpiDelta> = KpiMetric::ALL
            .iter()
            .map(|&m| (m, KpiDelta::between(first_kpis.get(m), second_kpis.get(m))))
            .collect();

        let distributions = DistributionDiff {
            contract: category_diff(first_records, second_records, SegmentField::Contract),
            internet_service: category_diff(first_records, second_records, SegmentField::InternetService),
            gender: category_diff(first_records, second_records, SegmentField::Gender),
        };

        let insights = self.pair_insights(first_kpis, second_kpis);
        debug!(first, second, insights = insights.len(), "compared pair");

        PairComparison {
            first,
            second,
            first_kpis: *first_kpis,
            second_kpis: *second_kpis,
            deltas,
            distributions,
            insights,
        }
    }

    fn pair_insights(&self, base: &Kpis, other: &Kpis) -> Vec<Insight> {
        let t = &self.thresholds;
        let mut insights = Vec::new();

        let churn_diff = round_to(other.churn_rate - base.churn_rate, 2);
        if churn_diff.abs() > t.churn_points {
            let insight = if churn_diff > 0.0 {
                let high = churn_diff > t.churn_points_high;
                Insight::new(
                    if high { InsightSeverity::Critical } else { InsightSeverity::Warning },
                    InsightCategory::Churn,
                    "Churn Rate Increased",
                    format!("Churn rate increased by {:.1} points", churn_diff),
                )
                .with_impact(if high { Impact::High } else { Impact::Medium })
                .with_recommendation("Investigate what changed between the two periods")
                .with_actions(&[
                    "Review recent pricing and service changes",
                    "Survey recently churned customers",
                    "Target retention offers at the affected segments",
                ])
            } else {
                Insight::new(
                    InsightSeverity::Opportunity,
                    InsightCategory::Churn,
                    "Churn Rate Decreased",
                    format!("Churn rate decreased by {:.1} points", churn_diff.abs()),
                )
                .with_impact(Impact::Medium)
                .with_recommendation("Identify and extend the tactics that reduced churn")
                .with_actions(&[
                    "Document retention changes made between the periods",
                    "Roll successful retention tactics out to other segments",
                ])
            };
            insights.push(
                insight
                    .with_metric("metric", KpiMetric::ChurnRate.name())
                    .with_metric("absolute", churn_diff),
            );
        }

        if base.customer_count > 0 {
            let diff = other.customer_count as i64 - base.customer_count as i64;
            let pct = diff as f64 / base.customer_count as f64 * 100.0;
            if pct.abs() > t.customer_growth_pct {
                let high = pct.abs() > t.customer_growth_pct_high;
                let (severity, title, verb) = if diff > 0 {
                    (InsightSeverity::Opportunity, "Customer Base Grew", "grew")
                } else if high {
                    (InsightSeverity::Critical, "Customer Base Shrunk", "shrunk")
                } else {
                    (InsightSeverity::Warning, "Customer Base Shrunk", "shrunk")
                };
                insights.push(
                    Insight::new(
                        severity,
                        InsightCategory::Growth,
                        title,
                        format!(
                            "Customer base {} by {:.1}% ({} customers)",
                            verb,
                            pct.abs(),
                            diff.unsigned_abs()
                        ),
                    )
                    .with_impact(if high { Impact::High } else { Impact::Medium })
                    .with_metric("metric", KpiMetric::CustomerCount.name())
                    .with_metric("absolute", diff)
                    .with_metric("percentage", round_to(pct, 2)),
                );
            }
        }

        if base.avg_monthly > 0.0 {
            let diff = other.avg_monthly - base.avg_monthly;
            let pct = diff / base.avg_monthly * 100.0;
            if pct.abs() > t.revenue_pct {
                let (severity, verb) = if diff > 0.0 {
                    (InsightSeverity::Opportunity, "increased")
                } else {
                    (InsightSeverity::Warning, "decreased")
                };
                insights.push(
                    Insight::new(
                        severity,
                        InsightCategory::Revenue,
                        "Average Revenue Changed",
                        format!(
                            "Average monthly revenue {} by {:.1}% (${:.2})",
                            verb,
                            pct.abs(),
                            diff.abs()
                        ),
                    )
                    .with_impact(Impact::Medium)
                    .with_metric("metric", KpiMetric::AvgMonthly.name())
                    .with_metric("absolute", round_to(diff, 2))
                    .with_metric("percentage", round_to(pct, 2)),
                );
            }
        }

        sort_by_severity(&mut insights);
        insights
    }
}

/// Compare datasets with default thresholds.
pub fn compare(datasets: &[Vec<CanonicalRecord>]) -> Result<ComparisonResult> {
    ComparisonEngine::new().compare(datasets)
}

/// Percentage-point change of every value of `field` seen in either dataset.
fn category_diff(
    first: &[CanonicalRecord],
    second: &[CanonicalRecord],
    field: SegmentField,
) -> Vec<CategoryDiff> {
    let mut counts: IndexMap<&str, (usize, usize)> = IndexMap::new();
    for r in first {
        let label = field.label(r).trim();
        if !label.is_empty() {
            counts.entry(label).or_default().0 += 1;
        }
    }
    for r in second {
        let label = field.label(r).trim();
        if !label.is_empty() {
            counts.entry(label).or_default().1 += 1;
        }
    }

    counts
        .into_iter()
        .map(|(value, (a, b))| {
            let pa = percentage(a, first.len());
            let pb = percentage(b, second.len());
            CategoryDiff {
                value: value.to_string(),
                first: CategoryShare {
                    count: a,
                    percentage: round_to(pa, 2),
                },
                second: CategoryShare {
                    count: b,
                    percentage: round_to(pb, 2),
                },
                difference: round_to(pb - pa, 2),
            }
        })
        .collect()
}

fn summarize(kpis: &[Kpis]) -> ComparisonSummary {
    let column = |metric: KpiMetric| -> Vec<f64> { kpis.iter().map(|k| k.get(metric)).collect() };
    ComparisonSummary {
        dataset_count: kpis.len(),
        total_customers: kpis.iter().map(|k| k.customer_count).sum(),
        avg_churn_rate: round_to(mean(&column(KpiMetric::ChurnRate)), 2),
        avg_tenure: round_to(mean(&column(KpiMetric::AvgTenure)), 1),
        avg_monthly: round_to(mean(&column(KpiMetric::AvgMonthly)), 2),
    }
}

fn recommend(comparisons: &[PairComparison]) -> Vec<Recommendation> {
    let increasing = comparisons
        .iter()
        .filter_map(|c| c.delta(KpiMetric::ChurnRate))
        .filter(|d| d.direction == Direction::Increase)
        .count();

    if increasing * 2 > comparisons.len() {
        vec![Recommendation {
            priority: Impact::High,
            category: InsightCategory::Retention,
            message: "Churn rate is increasing across datasets. Consider implementing retention strategies."
                .to_string(),
            actions: vec![
                "Review customer satisfaction".to_string(),
                "Analyze contract types".to_string(),
                "Improve support services".to_string(),
            ],
        }]
    } else {
        Vec::new()
    }
}
