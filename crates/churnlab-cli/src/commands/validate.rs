//! Validate command - report data quality problems in raw records.

use std::path::PathBuf;

use churnlab::RecordValidator;
use colored::Colorize;

use super::load_records;

pub fn run(file: PathBuf, json_output: bool, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let raw = load_records(&file)?;
    let report = RecordValidator::new().validate(&raw)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let verdict = if report.is_valid {
        "VALID".green().bold()
    } else {
        "INVALID".red().bold()
    };
    println!(
        "{} {} {}",
        "Validated".cyan().bold(),
        file.display().to_string().white(),
        verdict
    );
    println!();

    let stats = &report.stats;
    println!("Structure:      {}", report.structure);
    println!("Total rows:     {}", stats.total_rows);
    println!(
        "Valid rows:     {} ({:.1}%)",
        stats.valid_rows.to_string().green(),
        report.valid_percentage()
    );
    println!("Invalid rows:   {}", stats.invalid_rows.to_string().red());
    println!("Duplicates:     {}", stats.duplicates.to_string().yellow());
    println!("Missing values: {}", stats.missing_values);
    println!();

    if !report.errors.is_empty() {
        println!("{} ({})", "Errors:".red().bold(), report.error_count);
        for issue in &report.errors {
            println!("  {} {}", "✗".red(), issue);
        }
        println!();
    }

    if !report.warnings.is_empty() {
        println!("{} ({})", "Warnings:".yellow().bold(), report.warning_count);
        for issue in &report.warnings {
            println!("  {} {}", "!".yellow(), issue);
        }
        println!();
    }

    if report.is_truncated() {
        println!(
            "{}",
            "Issue lists are truncated; use --json for counts.".dimmed()
        );
    }

    if verbose {
        println!("{}", "Field fill rates:".yellow().bold());
        for (field, fill) in &stats.column_stats {
            println!(
                "  {:30} {:>6.1}% ({}/{})",
                field, fill.fill_rate, fill.filled, fill.total
            );
        }
    }

    Ok(())
}
