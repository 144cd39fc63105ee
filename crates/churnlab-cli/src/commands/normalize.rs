//! Normalize command - export canonical records.

use std::path::PathBuf;

use churnlab::Churnlab;
use colored::Colorize;

use super::{load_records, parse_structure, write_records};
use crate::cli::OutputFormat;

pub fn run(
    file: PathBuf,
    output: Option<PathBuf>,
    format: OutputFormat,
    structure: Option<String>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let raw = load_records(&file)?;
    let hint = parse_structure(structure)?;
    let outcome = Churnlab::new().normalize(&raw, hint)?;

    if verbose || output.is_some() {
        eprintln!(
            "{} {} rows: kept {}, dropped {} without id, {} duplicates",
            "Normalized".cyan().bold(),
            raw.len(),
            outcome.records.len().to_string().green(),
            outcome.dropped_missing_id,
            outcome.dropped_duplicates
        );
    }

    write_records(&outcome.records, &format, output.as_deref())
}
