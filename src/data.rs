use anyhow::{bail, Context, Result};
use serde_json::{Map, Number, Value};
use std::io::Read;

use crate::error::ChartError;

/// Name of the column synthesized from row positions when no x column is given.
pub const INDEX_COLUMN: &str = "index";

/// Tabular input: named columns over ordered rows.
///
/// Cells are kept as the strings they were read as; they are converted to
/// JSON values only when a column is bound to a trace.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Dataset {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Create a Dataset from named columns of equal length
    pub fn from_columns<N, V>(columns: Vec<(N, Vec<V>)>) -> Self
    where
        N: Into<String>,
        V: ToString,
    {
        let n_rows = columns.iter().map(|(_, c)| c.len()).max().unwrap_or(0);
        let mut headers = Vec::with_capacity(columns.len());
        let mut rows = vec![Vec::with_capacity(columns.len()); n_rows];

        for (name, values) in columns {
            headers.push(name.into());
            for (row_idx, row) in rows.iter_mut().enumerate() {
                row.push(values.get(row_idx).map(|v| v.to_string()).unwrap_or_default());
            }
        }

        Self { headers, rows }
    }

    /// Load a dataset from JSON: either an array of records
    /// (`[{"t": 0, "a": 4}, ...]`) or an object of columns
    /// (`{"t": [0, 1], "a": [4, 5]}`).
    ///
    /// Cells may be strings, numbers, booleans or null; a record missing a
    /// field gets an empty cell.
    pub fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::Array(records) => Self::from_records(records),
            Value::Object(columns) => Self::from_column_map(columns),
            _ => bail!("JSON data must be an array of records or an object of columns"),
        }
    }

    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        let value: Value = serde_json::from_reader(reader).context("Failed to parse JSON data")?;
        Self::from_json(&value)
    }

    fn from_records(records: &[Value]) -> Result<Self> {
        let mut headers: Vec<String> = Vec::new();
        for (idx, record) in records.iter().enumerate() {
            let fields = record
                .as_object()
                .with_context(|| format!("Record {} is not an object", idx))?;
            for key in fields.keys() {
                if !headers.contains(key) {
                    headers.push(key.clone());
                }
            }
        }

        let rows = records
            .iter()
            .enumerate()
            .map(|(idx, record)| {
                headers
                    .iter()
                    .map(|h| {
                        cell_text(record.get(h.as_str()).unwrap_or(&Value::Null))
                            .with_context(|| format!("Record {}, field '{}'", idx, h))
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { headers, rows })
    }

    fn from_column_map(columns: &Map<String, Value>) -> Result<Self> {
        let mut named = Vec::with_capacity(columns.len());
        for (name, values) in columns {
            let values = values
                .as_array()
                .with_context(|| format!("Column '{}' is not an array", name))?;
            let cells = values
                .iter()
                .map(cell_text)
                .collect::<Result<Vec<_>>>()
                .with_context(|| format!("Column '{}'", name))?;
            named.push((name.clone(), cells));
        }
        Ok(Self::from_columns(named))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }

    /// Values of the named column, converted to JSON values
    pub fn column(&self, name: &str) -> Result<Vec<Value>, ChartError> {
        let col_idx = self
            .headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| ChartError::ColumnNotFound(name.to_string()))?;

        Ok(self
            .rows
            .iter()
            .map(|row| row.get(col_idx).map(|s| cell_value(s)).unwrap_or(Value::Null))
            .collect())
    }

    /// Copy of this dataset with `name` holding the row positions 0..n.
    /// An existing column of the same name is replaced.
    pub fn with_row_index(&self, name: &str) -> Self {
        let mut out = self.clone();
        match out.headers.iter().position(|h| h == name) {
            Some(col_idx) => {
                for (row_idx, row) in out.rows.iter_mut().enumerate() {
                    if row.len() <= col_idx {
                        row.resize(col_idx + 1, String::new());
                    }
                    row[col_idx] = row_idx.to_string();
                }
            }
            None => {
                out.headers.push(name.to_string());
                let width = out.headers.len();
                for (row_idx, row) in out.rows.iter_mut().enumerate() {
                    row.resize(width - 1, String::new());
                    row.push(row_idx.to_string());
                }
            }
        }
        out
    }
}

/// Text form of a JSON cell, as if it had been read from CSV
fn cell_text(value: &Value) -> Result<String> {
    match value {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Array(_) | Value::Object(_) => bail!("Nested values are not supported"),
    }
}

/// Convert a raw cell into the JSON value handed to a trace
fn cell_value(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Value::Number(i.into());
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        if let Some(n) = Number::from_f64(f) {
            return Value::Number(n);
        }
    }
    Value::String(raw.to_string())
}
