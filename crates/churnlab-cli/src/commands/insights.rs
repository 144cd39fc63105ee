//! Insights command - rule-based findings for one dataset.

use std::path::PathBuf;

use churnlab::Churnlab;
use churnlab::insights::InsightSeverity;
use colored::Colorize;

use super::{load_config, load_records};

pub fn run(
    file: PathBuf,
    json_output: bool,
    config: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let churnlab = Churnlab::with_config(load_config(config)?);
    let raw = load_records(&file)?;
    let records = churnlab.normalize(&raw, None)?.records;
    let insights = churnlab.insights(&records);

    if json_output {
        println!("{}", serde_json::to_string_pretty(&insights)?);
        return Ok(());
    }

    println!(
        "{} {} insights for {} customers",
        "Generated".cyan().bold(),
        insights.len(),
        records.len()
    );
    println!();

    for insight in &insights {
        let header = format!("[{}] {}", insight.severity, insight.title);
        let header = match insight.severity {
            InsightSeverity::Critical => header.red().bold(),
            InsightSeverity::Warning => header.yellow().bold(),
            InsightSeverity::Opportunity => header.green().bold(),
            InsightSeverity::Info => header.blue().bold(),
        };
        println!("{} ({})", header, insight.category);
        println!("  {}", insight.message);
        if !insight.recommendation.is_empty() {
            println!("  {} {}", "→".cyan(), insight.recommendation);
        }
        for action in &insight.actions {
            println!("    - {}", action);
        }
        for (name, value) in &insight.metrics {
            println!("    {}: {}", name.dimmed(), value);
        }
        println!();
    }

    Ok(())
}
