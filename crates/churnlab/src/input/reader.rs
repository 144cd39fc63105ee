//! File adapter that decodes CSV/TSV/JSON into raw records.
//!
//! Decoding is deliberately shallow: cells stay strings and every semantic
//! decision is left to the normalizer.

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{ChurnlabError, Result};

use super::raw::{RawRecord, is_null_text};

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// JSON documents that wrap the record array in an object.
#[derive(Deserialize)]
struct WrappedRecords {
    #[serde(alias = "data", alias = "customers")]
    records: Vec<RawRecord>,
}

/// Read a file into raw records, choosing the decoder from the extension.
pub fn read_records(path: impl AsRef<Path>) -> Result<Vec<RawRecord>> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| ChurnlabError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    let records = match extension.as_str() {
        "json" => parse_json(&bytes)?,
        "tsv" | "tab" => parse_delimited(&bytes, b'\t')?,
        "csv" | "txt" | "" => parse_delimited(&bytes, detect_delimiter(&bytes))?,
        other => {
            return Err(ChurnlabError::UnsupportedFormat(format!(
                "'.{}' files are not supported (use csv, tsv or json)",
                other
            )));
        }
    };

    debug!(path = %path.display(), records = records.len(), "decoded input file");
    Ok(records)
}

/// Parse a JSON array of objects, or an object wrapping one.
pub fn parse_json(bytes: &[u8]) -> Result<Vec<RawRecord>> {
    match serde_json::from_slice::<Vec<RawRecord>>(bytes) {
        Ok(records) => Ok(records),
        Err(array_err) => match serde_json::from_slice::<WrappedRecords>(bytes) {
            Ok(wrapped) => Ok(wrapped.records),
            Err(_) => Err(array_err.into()),
        },
    }
}

/// Parse delimited text with a header row. Blank and NA cells become `null`.
pub fn parse_delimited(bytes: &[u8], delimiter: u8) -> Result<Vec<RawRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(bytes);

    let headers: Vec<String> = reader.headers()?.iter().map(|s| s.to_string()).collect();

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result?;
        let mut record = RawRecord::with_capacity(headers.len());
        for (idx, header) in headers.iter().enumerate() {
            let value = match row.get(idx) {
                Some(cell) if !is_null_text(cell) => Value::String(cell.to_string()),
                _ => Value::Null,
            };
            record.insert(header.clone(), value);
        }
        records.push(record);
    }

    Ok(records)
}

/// Detect the delimiter by checking consistency over the first lines.
fn detect_delimiter(bytes: &[u8]) -> u8 {
    let lines: Vec<String> = BufReader::new(bytes)
        .lines()
        .take(10)
        .map_while(|l| l.ok())
        .filter(|l| !l.trim().is_empty())
        .collect();

    let mut best_delimiter = b',';
    let mut best_score = 0;

    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delim))
            .collect();

        let Some(&first_count) = counts.first() else {
            continue;
        };
        if first_count == 0 {
            continue;
        }

        let score = if counts.iter().all(|&c| c == first_count) {
            first_count * 1000
        } else {
            first_count
        };

        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }

    best_delimiter
}

/// Count delimiter occurrences in a line, respecting quotes.
fn count_delimiter_in_line(line: &str, delimiter: u8) -> usize {
    let delim_char = delimiter as char;
    let mut count = 0;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delim_char && !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}
