use anyhow::{Context, Result};
use std::io::{self, Read};

use crate::data::Dataset;

/// Read CSV data from stdin
pub fn read_csv_from_stdin() -> Result<Dataset> {
    let stdin = io::stdin();
    read_csv(stdin.lock())
}

/// Read CSV data (header row first) from any reader
pub fn read_csv<R: Read>(reader: R) -> Result<Dataset> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()
        .context("Failed to read CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.is_empty() {
        anyhow::bail!("CSV input has no header row");
    }

    let mut rows = Vec::new();
    for (row_idx, record) in csv_reader.records().enumerate() {
        let record = record.with_context(|| format!("Failed to read CSV row {}", row_idx + 1))?;
        rows.push(record.iter().map(|field| field.to_string()).collect());
    }

    Ok(Dataset::new(headers, rows))
}
