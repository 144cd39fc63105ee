//! CLI command implementations.

pub mod analyze;
pub mod compare;
pub mod config;
pub mod filter;
pub mod insights;
pub mod normalize;
pub mod validate;

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use churnlab::{
    AnalyticsConfig, CanonicalRecord, InsightRules, RawRecord, RecordStructure, read_records,
};
use colored::Colorize;
use serde_json::Value;

use crate::cli::OutputFormat;

/// Load the configuration file if one was given, defaults otherwise.
pub fn load_config(path: Option<PathBuf>) -> Result<AnalyticsConfig, Box<dyn std::error::Error>> {
    match path {
        Some(p) => Ok(AnalyticsConfig::load(&p)?),
        None => Ok(AnalyticsConfig::default()),
    }
}

/// Read raw records from a data file, checking that it exists first.
pub fn load_records(file: &Path) -> Result<Vec<RawRecord>, Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }
    Ok(read_records(file)?)
}

pub fn parse_structure(
    structure: Option<String>,
) -> Result<Option<RecordStructure>, Box<dyn std::error::Error>> {
    Ok(structure.map(|s| s.parse::<RecordStructure>()).transpose()?)
}

/// Write canonical records as nested JSON or flat CSV, to a file or stdout.
pub fn write_records(
    records: &[CanonicalRecord],
    format: &OutputFormat,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let writer: Box<dyn Write> = match output {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout().lock()),
    };

    match format {
        OutputFormat::Json => {
            let mut writer = writer;
            serde_json::to_writer_pretty(&mut writer, records)?;
            writeln!(writer)?;
        }
        OutputFormat::Csv => {
            let mut csv_writer = csv::Writer::from_writer(writer);
            let rows: Vec<_> = records.iter().map(|r| r.to_flat_row()).collect();
            if let Some(first) = rows.first() {
                csv_writer.write_record(first.keys())?;
            }
            for row in &rows {
                csv_writer.write_record(row.values().map(cell_text))?;
            }
            csv_writer.flush()?;
        }
    }

    if let Some(path) = output {
        eprintln!(
            "{} {} records to {}",
            "Wrote".green().bold(),
            records.len(),
            path.display()
        );
    }
    Ok(())
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// How a churn rate compares with the configured tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChurnBand {
    Healthy,
    Warning,
    Critical,
}

impl ChurnBand {
    pub fn of(rate: f64, rules: &InsightRules) -> Self {
        if rate > rules.churn_critical {
            ChurnBand::Critical
        } else if rate > rules.churn_warning {
            ChurnBand::Warning
        } else {
            ChurnBand::Healthy
        }
    }
}

/// Color a churn percentage by its tier under the insight rules.
pub fn churn_colored(rate: f64, rules: &InsightRules) -> colored::ColoredString {
    let text = format!("{:.1}%", rate);
    match ChurnBand::of(rate, rules) {
        ChurnBand::Critical => text.red().bold(),
        ChurnBand::Warning => text.yellow(),
        ChurnBand::Healthy => text.green(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_churn_band_follows_rules() {
        let rules = InsightRules::default();
        assert_eq!(ChurnBand::of(35.0, &rules), ChurnBand::Critical);
        assert_eq!(ChurnBand::of(25.0, &rules), ChurnBand::Warning);
        assert_eq!(ChurnBand::of(20.0, &rules), ChurnBand::Healthy);

        let strict = InsightRules {
            churn_critical: 10.0,
            churn_warning: 5.0,
            ..InsightRules::default()
        };
        assert_eq!(ChurnBand::of(12.0, &strict), ChurnBand::Critical);
        assert_eq!(ChurnBand::of(7.0, &strict), ChurnBand::Warning);
    }
}
