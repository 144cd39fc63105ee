//! Insight entries produced by the rule engine and the comparison engine.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How urgently an insight should be looked at.
///
/// Ordered so that `Critical` is the greatest value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightSeverity {
    Info,
    Opportunity,
    Warning,
    Critical,
}

impl InsightSeverity {
    pub fn label(&self) -> &'static str {
        match self {
            InsightSeverity::Info => "Info",
            InsightSeverity::Opportunity => "Opportunity",
            InsightSeverity::Warning => "Warning",
            InsightSeverity::Critical => "Critical",
        }
    }
}

impl fmt::Display for InsightSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Business area an insight belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightCategory {
    Churn,
    Contracts,
    Revenue,
    Onboarding,
    Demographics,
    Services,
    Payments,
    Prevention,
    Growth,
    Retention,
}

impl InsightCategory {
    pub fn label(&self) -> &'static str {
        match self {
            InsightCategory::Churn => "churn",
            InsightCategory::Contracts => "contracts",
            InsightCategory::Revenue => "revenue",
            InsightCategory::Onboarding => "onboarding",
            InsightCategory::Demographics => "demographics",
            InsightCategory::Services => "services",
            InsightCategory::Payments => "payments",
            InsightCategory::Prevention => "prevention",
            InsightCategory::Growth => "growth",
            InsightCategory::Retention => "retention",
        }
    }
}

impl fmt::Display for InsightCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Expected business impact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    #[default]
    Low,
    Medium,
    High,
}

/// A qualitative finding with suggested follow-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub severity: InsightSeverity,
    pub category: InsightCategory,
    pub title: String,
    pub message: String,
    pub impact: Impact,
    pub recommendation: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<String>,
    /// Figures backing the insight, keyed by metric name.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub metrics: IndexMap<String, Value>,
}

impl Insight {
    pub fn new(
        severity: InsightSeverity,
        category: InsightCategory,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            title: title.into(),
            message: message.into(),
            impact: Impact::default(),
            recommendation: String::new(),
            actions: Vec::new(),
            metrics: IndexMap::new(),
        }
    }

    pub fn with_impact(mut self, impact: Impact) -> Self {
        self.impact = impact;
        self
    }

    pub fn with_recommendation(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendation = recommendation.into();
        self
    }

    pub fn with_actions(mut self, actions: &[&str]) -> Self {
        self.actions = actions.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn with_metric(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metrics.insert(name.into(), value.into());
        self
    }

    pub fn is_critical(&self) -> bool {
        self.severity == InsightSeverity::Critical
    }
}

impl fmt::Display for Insight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.title, self.message)
    }
}

/// Stable sort, most severe first.
pub fn sort_by_severity(insights: &mut [Insight]) {
    insights.sort_by(|a, b| b.severity.cmp(&a.severity));
}

pub fn by_category(insights: &[Insight], category: InsightCategory) -> Vec<&Insight> {
    insights.iter().filter(|i| i.category == category).collect()
}

pub fn by_severity(insights: &[Insight], severity: InsightSeverity) -> Vec<&Insight> {
    insights.iter().filter(|i| i.severity == severity).collect()
}

pub fn critical(insights: &[Insight]) -> Vec<&Insight> {
    by_severity(insights, InsightSeverity::Critical)
}
