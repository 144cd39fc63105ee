//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Churnlab: customer-churn dataset reconciliation and analytics
#[derive(Parser)]
#[command(name = "churnlab")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Analytics configuration file (JSON)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check raw records for missing fields, bad values and duplicates
    Validate {
        /// Path to the data file (CSV/TSV/JSON)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Map records onto the canonical schema and export them
    Normalize {
        /// Path to the data file (CSV/TSV/JSON)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "json")]
        format: OutputFormat,

        /// Force a record structure instead of detecting it (flat, nested, prefixed)
        #[arg(long)]
        structure: Option<String>,
    },

    /// Run the full analysis pipeline on one dataset
    Analyze {
        /// Path to the data file (CSV/TSV/JSON)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output the full result as JSON
        #[arg(long)]
        json: bool,

        /// Force a record structure instead of detecting it (flat, nested, prefixed)
        #[arg(long)]
        structure: Option<String>,
    },

    /// Compare KPIs and distributions across datasets
    Compare {
        /// Two or more data files
        #[arg(value_name = "FILE", num_args = 2.., required = true)]
        files: Vec<PathBuf>,

        /// Output the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate rule-based business insights
    Insights {
        /// Path to the data file (CSV/TSV/JSON)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output insights as JSON
        #[arg(long)]
        json: bool,
    },

    /// Filter canonical records and report the resulting view
    Filter {
        /// Path to the data file (CSV/TSV/JSON)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Range filter as FIELD=MIN..MAX (tenure, monthly, total)
        #[arg(long, value_name = "FIELD=MIN..MAX")]
        range: Vec<String>,

        /// Category filter as FIELD=V1,V2 (contract, internet, churn, gender, payment)
        #[arg(long, value_name = "FIELD=VALUES")]
        category: Vec<String>,

        /// Keep only senior (true) or non-senior (false) customers
        #[arg(long)]
        senior: Option<bool>,

        /// Free-text search over customer id, labels and charges
        #[arg(long)]
        search: Option<String>,

        /// Load a saved filter set (JSON) before applying the flags above
        #[arg(long, value_name = "FILE")]
        spec: Option<PathBuf>,

        /// Write the filtered records to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format for --output
        #[arg(short, long, default_value = "csv")]
        format: OutputFormat,

        /// Print the filter set as JSON
        #[arg(long)]
        export_spec: bool,
    },

    /// Print the effective analytics configuration as JSON
    Config {
        /// Write the configuration to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use json or csv.", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}
