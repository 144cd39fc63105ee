//! Compare command - KPI deltas and distribution shifts across datasets.

use std::path::PathBuf;

use churnlab::Churnlab;
use churnlab::compare::{Direction, KpiMetric};
use churnlab::insights::Impact;
use colored::Colorize;

use super::{churn_colored, load_config, load_records};

pub fn run(
    files: Vec<PathBuf>,
    json_output: bool,
    config: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config)?;
    let datasets = files
        .iter()
        .map(|f| load_records(f))
        .collect::<Result<Vec<_>, _>>()?;

    let rules = config.insights.clone();
    let result = Churnlab::with_config(config).compare(&datasets)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!(
        "{} {} datasets",
        "Comparing".cyan().bold(),
        result.total_datasets
    );
    for (i, file) in files.iter().enumerate() {
        println!("  [{}] {}", i, file.display());
    }
    println!();

    for pair in &result.comparisons {
        println!(
            "{}",
            format!("[{}] vs [{}]", pair.first, pair.second).yellow().bold()
        );
        for metric in [
            KpiMetric::CustomerCount,
            KpiMetric::ChurnRate,
            KpiMetric::AvgTenure,
            KpiMetric::AvgMonthly,
            KpiMetric::TotalRevenue,
        ] {
            let Some(delta) = pair.delta(metric) else {
                continue;
            };
            let arrow = match delta.direction {
                Direction::Increase => "▲".green(),
                Direction::Decrease => "▼".red(),
                Direction::Same => "=".normal(),
            };
            println!(
                "  {:16} {:>10.2} -> {:>10.2}  {} {:+.2} ({:+.2}%)",
                metric.name(),
                pair.first_kpis.get(metric),
                pair.second_kpis.get(metric),
                arrow,
                delta.absolute,
                delta.percentage
            );
        }
        for insight in &pair.insights {
            println!("  [{}] {}", insight.severity, insight.message);
        }
        println!();
    }

    let summary = &result.summary;
    println!("{}", "Summary:".yellow().bold());
    println!("  Total customers: {}", summary.total_customers);
    println!("  Avg churn rate:  {}", churn_colored(summary.avg_churn_rate, &rules));
    println!("  Avg tenure:      {:.1} months", summary.avg_tenure);
    println!("  Avg monthly:     ${:.2}", summary.avg_monthly);

    if !result.recommendations.is_empty() {
        println!();
        println!("{}", "Recommendations:".yellow().bold());
        for rec in &result.recommendations {
            let priority = match rec.priority {
                Impact::High => "HIGH".red().bold(),
                Impact::Medium => "MEDIUM".yellow(),
                Impact::Low => "LOW".normal(),
            };
            println!("  [{}] {}", priority, rec.message);
            for action in &rec.actions {
                println!("      - {}", action);
            }
        }
    }

    Ok(())
}
