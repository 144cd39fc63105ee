//! Churnlab CLI - customer-churn reconciliation and analytics.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing::Level;

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.clone();
    let result = match cli.command {
        Commands::Validate { file, json } => commands::validate::run(file, json, cli.verbose),

        Commands::Normalize {
            file,
            output,
            format,
            structure,
        } => commands::normalize::run(file, output, format, structure, cli.verbose),

        Commands::Analyze {
            file,
            json,
            structure,
        } => commands::analyze::run(file, json, structure, config, cli.verbose),

        Commands::Compare { files, json } => commands::compare::run(files, json, config),

        Commands::Insights { file, json } => commands::insights::run(file, json, config),

        Commands::Filter {
            file,
            range,
            category,
            senior,
            search,
            spec,
            output,
            format,
            export_spec,
        } => commands::filter::run(
            commands::filter::FilterArgs {
                file,
                range,
                category,
                senior,
                search,
                spec,
                output,
                format,
                export_spec,
            },
            cli.verbose,
        ),

        Commands::Config { output } => commands::config::run(output, config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
