//! Post-normalization cleaning and dataset merging.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ChurnlabError, Result};
use crate::schema::CanonicalRecord;

/// Records that survived cleaning plus what was dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleanOutcome {
    pub records: Vec<CanonicalRecord>,
    pub dropped_missing_id: usize,
    pub dropped_duplicates: usize,
}

impl CleanOutcome {
    pub fn dropped(&self) -> usize {
        self.dropped_missing_id + self.dropped_duplicates
    }
}

/// Drop records without an id and keep only the first record per id.
pub fn clean(records: Vec<CanonicalRecord>) -> CleanOutcome {
    let mut seen = HashSet::with_capacity(records.len());
    let mut outcome = CleanOutcome::default();

    for record in records {
        if record.customer_id.trim().is_empty() {
            outcome.dropped_missing_id += 1;
        } else if !seen.insert(record.customer_id.clone()) {
            outcome.dropped_duplicates += 1;
        } else {
            outcome.records.push(record);
        }
    }

    if outcome.dropped() > 0 {
        info!(
            kept = outcome.records.len(),
            missing_id = outcome.dropped_missing_id,
            duplicates = outcome.dropped_duplicates,
            "dropped records during cleaning"
        );
    }
    outcome
}

/// How [`merge`] combines datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    /// Every id once, first occurrence across datasets wins.
    #[default]
    Union,
    /// Records of the first dataset whose id appears in every dataset.
    Intersection,
    /// Plain concatenation.
    Append,
}

/// Combine several canonical datasets into one.
pub fn merge(datasets: &[Vec<CanonicalRecord>], strategy: MergeStrategy) -> Result<Vec<CanonicalRecord>> {
    let Some(first) = datasets.first() else {
        return Err(ChurnlabError::EmptyInput("no datasets to merge".to_string()));
    };

    let merged: Vec<CanonicalRecord> = match strategy {
        MergeStrategy::Append => datasets.iter().flatten().cloned().collect(),
        MergeStrategy::Union => {
            let mut seen = HashSet::new();
            datasets
                .iter()
                .flatten()
                .filter(|r| seen.insert(r.customer_id.as_str()))
                .cloned()
                .collect()
        }
        MergeStrategy::Intersection => {
            let others: Vec<HashSet<&str>> = datasets[1..]
                .iter()
                .map(|d| d.iter().map(|r| r.customer_id.as_str()).collect())
                .collect();
            first
                .iter()
                .filter(|r| others.iter().all(|ids| ids.contains(r.customer_id.as_str())))
                .cloned()
                .collect()
        }
    };

    debug!(datasets = datasets.len(), ?strategy, records = merged.len(), "merged datasets");
    Ok(merged)
}
