//! Filter names, predicate states and the serializable filter set.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::schema::CanonicalRecord;

/// Numeric fields that accept a range filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeField {
    Tenure,
    MonthlyCharge,
    TotalCharge,
}

impl RangeField {
    pub const ALL: [RangeField; 3] = [
        RangeField::Tenure,
        RangeField::MonthlyCharge,
        RangeField::TotalCharge,
    ];

    pub fn value(&self, record: &CanonicalRecord) -> f64 {
        match self {
            RangeField::Tenure => f64::from(record.demographics.tenure_months),
            RangeField::MonthlyCharge => record.billing.monthly_charge,
            RangeField::TotalCharge => record.billing.total_charge,
        }
    }
}

/// Categorical fields that accept an allowed-values filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryField {
    Contract,
    InternetService,
    Churn,
    Gender,
    PaymentMethod,
}

impl CategoryField {
    /// Canonical label of the field for a record.
    pub fn label<'r>(&self, record: &'r CanonicalRecord) -> &'r str {
        match self {
            CategoryField::Contract => record.billing.contract.label(),
            CategoryField::InternetService => record.services.internet_service.label(),
            CategoryField::Churn => record.churn_label(),
            CategoryField::Gender => &record.demographics.gender,
            CategoryField::PaymentMethod => &record.billing.payment_method,
        }
    }
}

/// Name of one filter slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKey {
    Tenure,
    MonthlyCharge,
    TotalCharge,
    Contract,
    InternetService,
    Churn,
    Gender,
    PaymentMethod,
    SeniorCitizen,
    Search,
}

impl FilterKey {
    pub const ALL: [FilterKey; 10] = [
        FilterKey::Tenure,
        FilterKey::MonthlyCharge,
        FilterKey::TotalCharge,
        FilterKey::Contract,
        FilterKey::InternetService,
        FilterKey::Churn,
        FilterKey::Gender,
        FilterKey::PaymentMethod,
        FilterKey::SeniorCitizen,
        FilterKey::Search,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FilterKey::Tenure => "tenure",
            FilterKey::MonthlyCharge => "monthly_charge",
            FilterKey::TotalCharge => "total_charge",
            FilterKey::Contract => "contract",
            FilterKey::InternetService => "internet_service",
            FilterKey::Churn => "churn",
            FilterKey::Gender => "gender",
            FilterKey::PaymentMethod => "payment_method",
            FilterKey::SeniorCitizen => "senior_citizen",
            FilterKey::Search => "search",
        }
    }

    /// Whether a predicate has the right shape for this slot.
    pub fn accepts(&self, predicate: &Predicate) -> bool {
        matches!(
            (self, predicate),
            (
                FilterKey::Tenure | FilterKey::MonthlyCharge | FilterKey::TotalCharge,
                Predicate::Range { .. }
            ) | (
                FilterKey::Contract
                    | FilterKey::InternetService
                    | FilterKey::Churn
                    | FilterKey::Gender
                    | FilterKey::PaymentMethod,
                Predicate::Category { .. }
            ) | (FilterKey::SeniorCitizen, Predicate::Flag { .. })
                | (FilterKey::Search, Predicate::Search { .. })
        )
    }

    fn default_predicate(&self) -> Predicate {
        match self {
            FilterKey::Tenure => Predicate::Range { min: 0.0, max: 72.0 },
            FilterKey::MonthlyCharge => Predicate::Range { min: 0.0, max: 120.0 },
            FilterKey::TotalCharge => Predicate::Range { min: 0.0, max: 9000.0 },
            FilterKey::Contract
            | FilterKey::InternetService
            | FilterKey::Churn
            | FilterKey::Gender
            | FilterKey::PaymentMethod => Predicate::Category { values: Vec::new() },
            FilterKey::SeniorCitizen => Predicate::Flag { value: false },
            FilterKey::Search => Predicate::Search {
                query: String::new(),
            },
        }
    }

    /// Evaluate a predicate of this slot against a record.
    fn matches(&self, predicate: &Predicate, record: &CanonicalRecord) -> bool {
        match (self, predicate) {
            (key, Predicate::Range { min, max }) => match key.range_field() {
                Some(field) => {
                    let v = field.value(record);
                    v >= *min && v <= *max
                }
                None => true,
            },
            (key, Predicate::Category { values }) => match key.category_field() {
                Some(field) => {
                    let label = field.label(record);
                    values.iter().any(|v| v.trim().eq_ignore_ascii_case(label))
                }
                None => true,
            },
            (FilterKey::SeniorCitizen, Predicate::Flag { value }) => {
                record.demographics.senior_citizen == *value
            }
            (FilterKey::Search, Predicate::Search { query }) => matches_search(record, query),
            _ => true,
        }
    }

    pub fn range_field(&self) -> Option<RangeField> {
        match self {
            FilterKey::Tenure => Some(RangeField::Tenure),
            FilterKey::MonthlyCharge => Some(RangeField::MonthlyCharge),
            FilterKey::TotalCharge => Some(RangeField::TotalCharge),
            _ => None,
        }
    }

    pub fn category_field(&self) -> Option<CategoryField> {
        match self {
            FilterKey::Contract => Some(CategoryField::Contract),
            FilterKey::InternetService => Some(CategoryField::InternetService),
            FilterKey::Churn => Some(CategoryField::Churn),
            FilterKey::Gender => Some(CategoryField::Gender),
            FilterKey::PaymentMethod => Some(CategoryField::PaymentMethod),
            _ => None,
        }
    }
}

impl From<RangeField> for FilterKey {
    fn from(field: RangeField) -> Self {
        match field {
            RangeField::Tenure => FilterKey::Tenure,
            RangeField::MonthlyCharge => FilterKey::MonthlyCharge,
            RangeField::TotalCharge => FilterKey::TotalCharge,
        }
    }
}

impl From<CategoryField> for FilterKey {
    fn from(field: CategoryField) -> Self {
        match field {
            CategoryField::Contract => FilterKey::Contract,
            CategoryField::InternetService => FilterKey::InternetService,
            CategoryField::Churn => FilterKey::Churn,
            CategoryField::Gender => FilterKey::Gender,
            CategoryField::PaymentMethod => FilterKey::PaymentMethod,
        }
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "tenure" => Ok(FilterKey::Tenure),
            "monthly" | "monthlycharge" | "monthlycharges" => Ok(FilterKey::MonthlyCharge),
            "total" | "totalcharge" | "totalcharges" => Ok(FilterKey::TotalCharge),
            "contract" => Ok(FilterKey::Contract),
            "internet" | "internetservice" => Ok(FilterKey::InternetService),
            "churn" => Ok(FilterKey::Churn),
            "gender" => Ok(FilterKey::Gender),
            "payment" | "paymentmethod" => Ok(FilterKey::PaymentMethod),
            "senior" | "seniorcitizen" => Ok(FilterKey::SeniorCitizen),
            "search" | "query" => Ok(FilterKey::Search),
            _ => Err(format!("unknown filter '{}'", s)),
        }
    }
}

/// Parameters of one filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// Inclusive bounds.
    Range { min: f64, max: f64 },
    /// Allowed labels, compared case-insensitively.
    Category { values: Vec<String> },
    Flag { value: bool },
    /// Lowercased substring query.
    Search { query: String },
}

/// A predicate plus whether it takes part in filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    pub predicate: Predicate,
    pub active: bool,
}

/// The full set of filter slots for a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSpec {
    filters: IndexMap<FilterKey, FilterState>,
}

impl Default for FilterSpec {
    fn default() -> Self {
        let filters = FilterKey::ALL
            .into_iter()
            .map(|key| {
                let state = FilterState {
                    predicate: key.default_predicate(),
                    active: false,
                };
                (key, state)
            })
            .collect();
        Self { filters }
    }
}

impl FilterSpec {
    pub fn get(&self, key: FilterKey) -> Option<&FilterState> {
        self.filters.get(&key)
    }

    /// Store a predicate under a key, activating or deactivating it.
    ///
    /// Returns false and leaves the slot unchanged when the predicate shape
    /// does not fit the key.
    pub fn set(&mut self, key: FilterKey, predicate: Predicate, active: bool) -> bool {
        if !key.accepts(&predicate) {
            return false;
        }
        self.filters.insert(key, FilterState { predicate, active });
        true
    }

    /// Deactivate one slot, resetting its values or query.
    pub fn clear(&mut self, key: FilterKey) {
        if let Some(state) = self.filters.get_mut(&key) {
            state.active = false;
            match &mut state.predicate {
                Predicate::Category { values } => values.clear(),
                Predicate::Search { query } => query.clear(),
                Predicate::Range { .. } | Predicate::Flag { .. } => {}
            }
        }
    }

    pub fn clear_all(&mut self) {
        for key in FilterKey::ALL {
            self.clear(key);
        }
    }

    /// Active slots in slot order.
    pub fn active(&self) -> impl Iterator<Item = (FilterKey, &FilterState)> {
        self.filters
            .iter()
            .filter(|(_, state)| state.active)
            .map(|(key, state)| (*key, state))
    }

    pub fn active_count(&self) -> usize {
        self.active().count()
    }

    /// Logical AND over every active slot.
    pub fn matches(&self, record: &CanonicalRecord) -> bool {
        self.active()
            .all(|(key, state)| key.matches(&state.predicate, record))
    }

    /// Check that every slot holds a predicate of the right shape.
    pub fn is_well_formed(&self) -> bool {
        self.filters
            .iter()
            .all(|(key, state)| key.accepts(&state.predicate))
    }
}

/// Case-insensitive substring match over the searchable fields of a record.
pub fn matches_search(record: &CanonicalRecord, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    searchable_fields(record)
        .iter()
        .any(|field| !field.is_empty() && field.to_lowercase().contains(&query))
}

fn searchable_fields(record: &CanonicalRecord) -> [String; 12] {
    let d = &record.demographics;
    let s = &record.services;
    let b = &record.billing;
    let yes_no = |v: bool| String::from(if v { "Yes" } else { "No" });

    [
        record.customer_id.clone(),
        record.churn_label().to_string(),
        d.gender.clone(),
        yes_no(d.has_partner),
        yes_no(d.has_dependents),
        yes_no(s.phone_service),
        s.internet_service.label().to_string(),
        b.contract.label().to_string(),
        b.payment_method.clone(),
        d.tenure_months.to_string(),
        b.monthly_charge.to_string(),
        b.total_charge.to_string(),
    ]
}
