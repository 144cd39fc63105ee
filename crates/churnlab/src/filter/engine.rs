//! Session-scoped filter engine over one immutable dataset.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ChurnlabError, Result};
use crate::schema::CanonicalRecord;

use super::spec::{CategoryField, FilterKey, FilterSpec, FilterState, Predicate, RangeField};

/// Observed bounds of a range field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataRange {
    pub min: f64,
    pub max: f64,
}

/// Counts describing the current filtered view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterStats {
    pub original_count: usize,
    pub filtered_count: usize,
    /// Share of the baseline still visible, rounded to 1 decimal.
    pub filtered_percentage: f64,
    pub active_filters: usize,
}

/// A saved filter set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterPreset {
    pub name: String,
    pub description: String,
    pub spec: FilterSpec,
    pub created_at: DateTime<Utc>,
}

/// Stateful filter session.
///
/// The baseline slice is only ever read. The current view is a list of
/// baseline indices in baseline order.
pub struct FilterEngine<'a> {
    baseline: &'a [CanonicalRecord],
    spec: FilterSpec,
    view: Vec<usize>,
}

impl<'a> FilterEngine<'a> {
    /// Start a session. Range slots are initialised to the observed data bounds.
    pub fn new(baseline: &'a [CanonicalRecord]) -> Self {
        let mut engine = Self {
            baseline,
            spec: FilterSpec::default(),
            view: (0..baseline.len()).collect(),
        };
        for (field, range) in engine.data_ranges() {
            engine.spec.set(
                field.into(),
                Predicate::Range {
                    min: range.min,
                    max: range.max,
                },
                false,
            );
        }
        engine
    }

    /// Activate a range filter (inclusive bounds) and recompute.
    pub fn set_range(&mut self, field: RangeField, min: f64, max: f64) -> Vec<&'a CanonicalRecord> {
        self.spec.set(field.into(), Predicate::Range { min, max }, true);
        self.apply()
    }

    /// Activate an allowed-values filter and recompute. An empty list leaves it inactive.
    pub fn set_category<S: AsRef<str>>(
        &mut self,
        field: CategoryField,
        values: &[S],
    ) -> Vec<&'a CanonicalRecord> {
        let values: Vec<String> = values
            .iter()
            .map(|v| v.as_ref().trim().to_string())
            .filter(|v| !v.is_empty())
            .collect();
        let active = !values.is_empty();
        self.spec
            .set(field.into(), Predicate::Category { values }, active);
        self.apply()
    }

    /// Filter on the senior-citizen flag; `None` deactivates it.
    pub fn set_senior_citizen(&mut self, value: Option<bool>) -> Vec<&'a CanonicalRecord> {
        self.spec.set(
            FilterKey::SeniorCitizen,
            Predicate::Flag {
                value: value.unwrap_or(false),
            },
            value.is_some(),
        );
        self.apply()
    }

    /// Activate the free-text search and recompute. A blank query leaves it inactive.
    pub fn set_search(&mut self, query: &str) -> Vec<&'a CanonicalRecord> {
        let query = query.trim().to_lowercase();
        let active = !query.is_empty();
        self.spec
            .set(FilterKey::Search, Predicate::Search { query }, active);
        self.apply()
    }

    /// Deactivate one filter, or all of them when `key` is `None`.
    pub fn clear(&mut self, key: Option<FilterKey>) -> Vec<&'a CanonicalRecord> {
        match key {
            Some(key) => self.spec.clear(key),
            None => self.spec.clear_all(),
        }
        self.apply()
    }

    /// Recompute the view as the logical AND of all active filters.
    pub fn apply(&mut self) -> Vec<&'a CanonicalRecord> {
        let baseline = self.baseline;
        self.view = baseline
            .iter()
            .enumerate()
            .filter(|(_, record)| self.spec.matches(record))
            .map(|(idx, _)| idx)
            .collect();

        debug!(
            filtered = self.view.len(),
            total = baseline.len(),
            active = self.spec.active_count(),
            "applied filters"
        );
        self.filtered()
    }

    /// The current view without recomputing.
    pub fn filtered(&self) -> Vec<&'a CanonicalRecord> {
        let baseline = self.baseline;
        self.view.iter().map(|&idx| &baseline[idx]).collect()
    }

    /// Owned copy of the current view.
    pub fn filtered_records(&self) -> Vec<CanonicalRecord> {
        self.view.iter().map(|&idx| self.baseline[idx].clone()).collect()
    }

    pub fn baseline(&self) -> &'a [CanonicalRecord] {
        self.baseline
    }

    pub fn spec(&self) -> &FilterSpec {
        &self.spec
    }

    /// Min and max of every range field over the baseline; zeros when empty.
    pub fn data_ranges(&self) -> IndexMap<RangeField, DataRange> {
        RangeField::ALL
            .into_iter()
            .map(|field| {
                let range = self
                    .baseline
                    .iter()
                    .map(|r| field.value(r))
                    .fold(None, |acc: Option<DataRange>, v| {
                        Some(match acc {
                            None => DataRange { min: v, max: v },
                            Some(r) => DataRange {
                                min: r.min.min(v),
                                max: r.max.max(v),
                            },
                        })
                    })
                    .unwrap_or(DataRange { min: 0.0, max: 0.0 });
                (field, range)
            })
            .collect()
    }

    pub fn stats(&self) -> FilterStats {
        let original = self.baseline.len();
        let filtered = self.view.len();
        let filtered_percentage = if original == 0 {
            0.0
        } else {
            (filtered as f64 / original as f64 * 1000.0).round() / 10.0
        };
        FilterStats {
            original_count: original,
            filtered_count: filtered,
            filtered_percentage,
            active_filters: self.spec.active_count(),
        }
    }

    pub fn active_filters(&self) -> IndexMap<FilterKey, FilterState> {
        self.spec
            .active()
            .map(|(key, state)| (key, state.clone()))
            .collect()
    }

    /// Serialize the filter set as pretty JSON.
    pub fn export_spec(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.spec)?)
    }

    /// Replace the filter set from JSON and recompute.
    ///
    /// On error the current filters stay in place.
    pub fn import_spec(&mut self, json: &str) -> Result<Vec<&'a CanonicalRecord>> {
        let spec: FilterSpec = serde_json::from_str(json)?;
        if !spec.is_well_formed() {
            return Err(ChurnlabError::Config(
                "filter predicate does not match its filter name".to_string(),
            ));
        }
        self.spec = spec;
        Ok(self.apply())
    }

    /// Snapshot the current filters under a name.
    pub fn create_preset(&self, name: impl Into<String>, description: impl Into<String>) -> FilterPreset {
        FilterPreset {
            name: name.into(),
            description: description.into(),
            spec: self.spec.clone(),
            created_at: Utc::now(),
        }
    }

    /// Restore a preset's filters and recompute.
    pub fn apply_preset(&mut self, preset: &FilterPreset) -> Vec<&'a CanonicalRecord> {
        self.spec = preset.spec.clone();
        self.apply()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ContractType;

    fn dataset() -> Vec<CanonicalRecord> {
        let specs = [
            ("A", true, 1, 20.0, "Female", ContractType::MonthToMonth),
            ("B", false, 24, 80.0, "Male", ContractType::OneYear),
            ("C", true, 5, 95.5, "Female", ContractType::MonthToMonth),
            ("D", false, 60, 45.0, "Male", ContractType::TwoYear),
        ];
        specs
            .iter()
            .map(|(id, churned, tenure, monthly, gender, contract)| {
                let mut r = CanonicalRecord::new(*id, *churned);
                r.demographics.tenure_months = *tenure;
                r.demographics.gender = gender.to_string();
                r.billing.monthly_charge = *monthly;
                r.billing.total_charge = *monthly * f64::from(*tenure);
                r.billing.contract = *contract;
                r
            })
            .collect()
    }

    fn ids(records: &[&CanonicalRecord]) -> Vec<String> {
        records.iter().map(|r| r.customer_id.clone()).collect()
    }

    #[test]
    fn test_range_and_category_compose() {
        let data = dataset();
        let mut engine = FilterEngine::new(&data);

        let view = engine.set_range(RangeField::Tenure, 0.0, 30.0);
        assert_eq!(ids(&view), vec!["A", "B", "C"]);

        let view = engine.set_category(CategoryField::Contract, &["Month-to-month"]);
        assert_eq!(ids(&view), vec!["A", "C"]);

        let view = engine.set_category(CategoryField::Churn, &["yes"]);
        assert_eq!(ids(&view), vec!["A", "C"]);

        assert_eq!(engine.stats().active_filters, 3);
        assert_eq!(engine.stats().filtered_percentage, 50.0);
    }

    #[test]
    fn test_clear_restores_baseline() {
        let data = dataset();
        let mut engine = FilterEngine::new(&data);
        engine.set_search("female");
        engine.set_range(RangeField::MonthlyCharge, 50.0, 100.0);
        assert_eq!(ids(&engine.filtered()), vec!["C"]);

        let view = engine.clear(Some(FilterKey::MonthlyCharge));
        assert_eq!(ids(&view), vec!["A", "C"]);

        let view = engine.clear(None);
        assert_eq!(view.len(), data.len());
        assert!(view.iter().zip(&data).all(|(a, b)| *a == b));
    }

    #[test]
    fn test_empty_values_leave_filter_inactive() {
        let data = dataset();
        let mut engine = FilterEngine::new(&data);
        let empty: [&str; 0] = [];

        assert_eq!(engine.set_category(CategoryField::Gender, &empty).len(), 4);
        assert_eq!(engine.set_search("   ").len(), 4);
        assert!(engine.active_filters().is_empty());
    }

    #[test]
    fn test_senior_filter() {
        let mut data = dataset();
        data[1].demographics.senior_citizen = true;
        let mut engine = FilterEngine::new(&data);

        assert_eq!(ids(&engine.set_senior_citizen(Some(true))), vec!["B"]);
        assert_eq!(engine.set_senior_citizen(None).len(), 4);
    }

    #[test]
    fn test_data_ranges() {
        let data = dataset();
        let engine = FilterEngine::new(&data);
        let ranges = engine.data_ranges();

        assert_eq!(ranges[&RangeField::Tenure], DataRange { min: 1.0, max: 60.0 });
        assert_eq!(ranges[&RangeField::MonthlyCharge].max, 95.5);

        let empty = FilterEngine::new(&[]);
        assert_eq!(empty.data_ranges()[&RangeField::TotalCharge].max, 0.0);
        assert_eq!(empty.stats().filtered_percentage, 0.0);
    }

    #[test]
    fn test_export_import_and_presets() {
        let data = dataset();
        let mut engine = FilterEngine::new(&data);
        engine.set_category(CategoryField::Gender, &["Male"]);
        let exported = engine.export_spec().unwrap();
        let preset = engine.create_preset("men", "male customers");

        engine.clear(None);
        assert_eq!(engine.import_spec(&exported).unwrap().len(), 2);

        engine.clear(None);
        assert_eq!(ids(&engine.apply_preset(&preset)), vec!["B", "D"]);
        assert_eq!(preset.name, "men");

        assert!(engine.import_spec("not json").is_err());
        let bad = r#"{"tenure": {"predicate": {"flag": {"value": true}}, "active": true}}"#;
        assert!(matches!(engine.import_spec(bad), Err(ChurnlabError::Config(_))));
        assert_eq!(engine.filtered().len(), 2);
    }
}
