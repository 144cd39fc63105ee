//! Error types for the churnlab library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for churnlab operations.
///
/// Only the first three variants can come out of the pure analytics core.
/// Row-level problems never surface here; they are collected into a
/// [`ValidationReport`](crate::validation::ValidationReport) instead.
#[derive(Debug, Error)]
pub enum ChurnlabError {
    /// No records were supplied to an operation that needs at least one.
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// Too few datasets were supplied for a comparison.
    #[error("Insufficient data: need at least {required} datasets, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// Record structure could not be classified.
    #[error("Unknown record structure: {0}")]
    UnknownStructure(String),

    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File format not supported.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for churnlab operations.
pub type Result<T> = std::result::Result<T, ChurnlabError>;
