//! Schema normalizer: raw records of any supported shape to canonical records.

use serde_json::Value;
use tracing::{debug, info};

use crate::error::{ChurnlabError, Result};
use crate::input::{RawRecord, RecordStructure, StructureDetector, get_literal, get_path, is_missing};
use crate::schema::{
    Billing, CanonicalField, CanonicalRecord, Demographics, Services, aliases,
};

use super::values::{
    normalize_bool, normalize_contract, normalize_internet, normalize_number,
    normalize_service_flag, normalize_tenure, normalize_text,
};

/// Maps raw records onto the canonical schema.
///
/// The normalizer holds no state besides an optional structure hint, so one
/// instance can be reused across datasets.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaNormalizer {
    hint: Option<RecordStructure>,
}

impl SchemaNormalizer {
    /// Create a normalizer that detects the structure from the first record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a normalizer that skips detection and uses the given structure.
    pub fn with_structure(structure: RecordStructure) -> Self {
        Self {
            hint: Some(structure),
        }
    }

    /// Normalize a dataset.
    ///
    /// Fails only when `records` is empty. Malformed fields degrade to defaults.
    pub fn normalize(&self, records: &[RawRecord]) -> Result<Vec<CanonicalRecord>> {
        if records.is_empty() {
            return Err(ChurnlabError::EmptyInput(
                "no records to normalize".to_string(),
            ));
        }

        let structure = match self.hint {
            Some(structure) => structure,
            None => StructureDetector::detect_dataset(records),
        };
        debug!(%structure, hinted = self.hint.is_some(), "normalizing records");

        let normalized: Vec<CanonicalRecord> = records
            .iter()
            .map(|raw| Self::normalize_record(raw, structure))
            .collect();

        info!(records = normalized.len(), %structure, "normalization complete");
        Ok(normalized)
    }

    /// Normalize one record under a known structure.
    pub fn normalize_record(raw: &RawRecord, structure: RecordStructure) -> CanonicalRecord {
        let resolver = FieldResolver { raw, structure };
        let get = |field| resolver.resolve(field);

        CanonicalRecord {
            customer_id: normalize_text(get(CanonicalField::CustomerId)),
            churned: normalize_bool(get(CanonicalField::Churned)),
            demographics: Demographics {
                gender: normalize_text(get(CanonicalField::Gender)),
                senior_citizen: normalize_bool(get(CanonicalField::SeniorCitizen)),
                has_partner: normalize_bool(get(CanonicalField::HasPartner)),
                has_dependents: normalize_bool(get(CanonicalField::HasDependents)),
                tenure_months: normalize_tenure(get(CanonicalField::TenureMonths)),
            },
            services: Services {
                phone_service: normalize_bool(get(CanonicalField::PhoneService)),
                multiple_lines: normalize_service_flag(get(CanonicalField::MultipleLines)),
                internet_service: normalize_internet(get(CanonicalField::InternetService)),
                online_security: normalize_service_flag(get(CanonicalField::OnlineSecurity)),
                online_backup: normalize_service_flag(get(CanonicalField::OnlineBackup)),
                device_protection: normalize_service_flag(get(CanonicalField::DeviceProtection)),
                tech_support: normalize_service_flag(get(CanonicalField::TechSupport)),
                streaming_tv: normalize_service_flag(get(CanonicalField::StreamingTv)),
                streaming_movies: normalize_service_flag(get(CanonicalField::StreamingMovies)),
            },
            billing: Billing {
                contract: normalize_contract(get(CanonicalField::Contract)),
                paperless_billing: normalize_bool(get(CanonicalField::PaperlessBilling)),
                payment_method: normalize_text(get(CanonicalField::PaymentMethod)),
                monthly_charge: normalize_number(get(CanonicalField::MonthlyCharge)),
                total_charge: normalize_number(get(CanonicalField::TotalCharge)),
            },
        }
    }
}

/// Convenience wrapper: normalize with an optional structure hint.
pub fn normalize(
    records: &[RawRecord],
    hint: Option<RecordStructure>,
) -> Result<Vec<CanonicalRecord>> {
    match hint {
        Some(structure) => SchemaNormalizer::with_structure(structure).normalize(records),
        None => SchemaNormalizer::new().normalize(records),
    }
}

/// Resolves canonical fields against one raw record through the alias table.
pub(crate) struct FieldResolver<'a> {
    pub(crate) raw: &'a RawRecord,
    pub(crate) structure: RecordStructure,
}

impl<'a> FieldResolver<'a> {
    /// First present, non-missing value among the field's aliases.
    pub(crate) fn resolve(&self, field: CanonicalField) -> Option<&'a Value> {
        self.candidates(field).find(|value| !is_missing(value))
    }

    /// Whether any alias of the field exists as a key, even with a missing value.
    pub(crate) fn is_present(&self, field: CanonicalField) -> bool {
        self.candidates(field).next().is_some()
    }

    fn candidates(&self, field: CanonicalField) -> impl Iterator<Item = &'a Value> + '_ {
        let raw = self.raw;
        aliases(field)
            .for_structure(self.structure)
            .filter_map(move |alias| match self.structure {
                RecordStructure::Nested => get_path(raw, alias),
                RecordStructure::Flat | RecordStructure::Prefixed => get_literal(raw, alias),
            })
    }
}
