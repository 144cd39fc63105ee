//! Config command - print or write the effective analytics configuration.

use std::path::PathBuf;

use colored::Colorize;

use super::load_config;

pub fn run(output: Option<PathBuf>, config: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config)?;

    match output {
        Some(path) => {
            config.save(&path)?;
            println!(
                "{} {}",
                "Wrote configuration to".green().bold(),
                path.display()
            );
        }
        None => println!("{}", serde_json::to_string_pretty(&config)?),
    }

    Ok(())
}
