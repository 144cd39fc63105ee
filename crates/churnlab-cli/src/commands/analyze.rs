//! Analyze command - run the full pipeline on one dataset.

use std::path::PathBuf;

use churnlab::Churnlab;
use churnlab::insights::InsightSeverity;
use colored::Colorize;

use super::{churn_colored, load_config, load_records, parse_structure};

pub fn run(
    file: PathBuf,
    json_output: bool,
    structure: Option<String>,
    config: Option<PathBuf>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config)?;
    let raw = load_records(&file)?;
    let hint = parse_structure(structure)?;

    if !json_output {
        println!(
            "{} {}",
            "Analyzing".cyan().bold(),
            file.display().to_string().white()
        );
    }

    let rules = config.insights.clone();
    let result = Churnlab::with_config(config).analyze(&raw, hint)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let kpis = &result.kpis;
    println!();
    println!("{}", "Overview:".yellow().bold());
    println!("  Structure:       {}", result.structure);
    println!(
        "  Customers:       {} ({} dropped in cleaning)",
        kpis.customer_count.to_string().white().bold(),
        result.cleaning.input - result.cleaning.kept
    );
    println!("  Churn rate:      {}", churn_colored(kpis.churn_rate, &rules));
    println!("  Avg tenure:      {:.1} months", kpis.avg_tenure);
    println!("  Avg monthly:     ${:.2}", kpis.avg_monthly);
    println!("  Monthly revenue: ${:.2}", kpis.total_revenue);
    if !result.validation.is_valid {
        println!(
            "  Validation:      {} errors, {} warnings",
            result.validation.error_count.to_string().red(),
            result.validation.warning_count.to_string().yellow()
        );
    }
    println!();

    println!(
        "{} (k={}, {} iterations{})",
        "Segments:".yellow().bold(),
        result.clusters.k,
        result.clusters.iterations,
        if result.clusters.converged { "" } else { ", not converged" }
    );
    for profile in &result.clusters.profiles {
        let label = profile
            .label
            .map(|l| l.to_string())
            .unwrap_or_else(|| "Empty".to_string());
        println!(
            "  #{} {:28} {:>5} customers  tenure {:>5.1}  ${:>6.2}/mo  churn {}",
            profile.cluster,
            label,
            profile.size,
            profile.avg_tenure,
            profile.avg_monthly,
            churn_colored(profile.churn_rate, &rules)
        );
    }
    println!();

    if !result.high_correlations.is_empty() {
        println!("{}", "Strong correlations:".yellow().bold());
        for pair in &result.high_correlations {
            println!("  {} ~ {}: {:+.3}", pair.first, pair.second, pair.r);
        }
        println!();
    }

    let anomalies = &result.anomalies;
    if let Some(bounds) = anomalies.bounds {
        println!(
            "{} {} outside [{:.2}, {:.2}] on {}",
            "Anomalies:".yellow().bold(),
            anomalies.anomalies.len(),
            bounds.lower,
            bounds.upper,
            anomalies.field
        );
        if verbose {
            for a in &anomalies.anomalies {
                println!("  {:12} {:>10.2} (z={:+.2})", a.customer_id, a.value, a.z_score);
            }
        }
        println!();
    }

    if verbose {
        println!("{}", "Churn by segment:".yellow().bold());
        for (field, rows) in &result.segments {
            println!("  {}", field.to_string().white().bold());
            for row in rows {
                println!(
                    "    {:28} {:>5} customers  churn {}",
                    row.segment,
                    row.customers,
                    churn_colored(row.churn_rate, &rules)
                );
            }
        }
        println!();
    }

    println!("{}", "Insights:".yellow().bold());
    if result.insights.is_empty() {
        println!("  {}", "No findings.".dimmed());
    }
    for insight in &result.insights {
        let tag = match insight.severity {
            InsightSeverity::Critical => insight.severity.label().red().bold(),
            InsightSeverity::Warning => insight.severity.label().yellow(),
            InsightSeverity::Opportunity => insight.severity.label().green(),
            InsightSeverity::Info => insight.severity.label().blue(),
        };
        println!("  [{}] {}", tag, insight.title.white().bold());
        println!("      {}", insight.message);
    }

    Ok(())
}
