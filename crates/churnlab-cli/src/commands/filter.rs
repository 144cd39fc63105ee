//! Filter command - narrow canonical records and report the view.

use std::fs;
use std::path::PathBuf;

use churnlab::filter::FilterKey;
use churnlab::{Churnlab, FilterEngine};
use colored::Colorize;

use super::{load_records, write_records};
use crate::cli::OutputFormat;

pub struct FilterArgs {
    pub file: PathBuf,
    pub range: Vec<String>,
    pub category: Vec<String>,
    pub senior: Option<bool>,
    pub search: Option<String>,
    pub spec: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub format: OutputFormat,
    pub export_spec: bool,
}

pub fn run(args: FilterArgs, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let raw = load_records(&args.file)?;
    let records = Churnlab::new().normalize(&raw, None)?.records;
    let mut engine = FilterEngine::new(&records);

    if let Some(path) = &args.spec {
        engine.import_spec(&fs::read_to_string(path)?)?;
    }

    for expr in &args.range {
        let (key, min, max) = parse_range(expr)?;
        let field = key
            .range_field()
            .ok_or_else(|| format!("'{}' does not take a range", key))?;
        engine.set_range(field, min, max);
    }

    for expr in &args.category {
        let (key, values) = split_assignment(expr)?;
        let key: FilterKey = key.parse()?;
        let field = key
            .category_field()
            .ok_or_else(|| format!("'{}' does not take category values", key))?;
        let values: Vec<&str> = values.split(',').map(str::trim).collect();
        engine.set_category(field, values.as_slice());
    }

    if args.senior.is_some() {
        engine.set_senior_citizen(args.senior);
    }

    if let Some(query) = &args.search {
        engine.set_search(query);
    }

    let stats = engine.stats();
    println!(
        "{} {}/{} records ({:.1}%) with {} active filters",
        "Filtered".cyan().bold(),
        stats.filtered_count.to_string().white().bold(),
        stats.original_count,
        stats.filtered_percentage,
        stats.active_filters
    );

    if verbose {
        for (key, state) in engine.active_filters() {
            println!("  {:18} {:?}", key.name(), state.predicate);
        }
    }

    if args.export_spec {
        println!("{}", engine.export_spec()?);
    }

    if let Some(output) = &args.output {
        write_records(&engine.filtered_records(), &args.format, Some(output))?;
    }

    Ok(())
}

fn split_assignment(expr: &str) -> Result<(&str, &str), String> {
    expr.split_once('=')
        .map(|(k, v)| (k.trim(), v.trim()))
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{}'", expr))
}

/// Parse `FIELD=MIN..MAX`.
fn parse_range(expr: &str) -> Result<(FilterKey, f64, f64), Box<dyn std::error::Error>> {
    let (key, bounds) = split_assignment(expr)?;
    let (min, max) = bounds
        .split_once("..")
        .ok_or_else(|| format!("expected MIN..MAX, got '{}'", bounds))?;
    Ok((key.parse()?, min.trim().parse()?, max.trim().parse()?))
}
