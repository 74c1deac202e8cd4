//! Upload adapters: CSV and JSON sources turned into `RawRow`s.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde_json::Value;

use crate::error::{AttendanceError, Result};
use crate::record::{FieldValue, RawRow};

pub const REQUIRED_COLUMNS: [&str; 5] = ["id", "name", "department", "attendance", "total_days"];

/// Reads rows from a `.csv` or `.json` file, chosen by extension.
pub fn read_rows_from_path(path: &Path) -> Result<Vec<RawRow>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let file = File::open(path).map_err(|e| AttendanceError::io(path, e))?;
    match extension.as_str() {
        "csv" => read_csv_rows(file),
        "json" => read_json_rows(file),
        _ => Err(AttendanceError::UnsupportedInput(format!(
            "unsupported file type for {:?}, use .csv or .json",
            path
        ))),
    }
}

/// Parses CSV with a header row. Headers are matched case-insensitively
/// and all of `REQUIRED_COLUMNS` must be present. Empty cells are treated
/// as absent.
pub fn read_csv_rows<R: Read>(reader: R) -> Result<Vec<RawRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim().to_ascii_lowercase())
        .collect();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !headers.iter().any(|h| h == *c))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(AttendanceError::MissingColumns(missing));
    }

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let mut row = RawRow::default();
        for (header, cell) in headers.iter().zip(record.iter()) {
            if !cell.is_empty() {
                row.set(header, FieldValue::from(cell));
            }
        }
        rows.push(row);
    }
    Ok(rows)
}

pub fn read_json_rows<R: Read>(reader: R) -> Result<Vec<RawRow>> {
    let value: Value = serde_json::from_reader(reader)?;
    rows_from_json(value)
}

/// Accepts a JSON array of objects. Elements that are not objects become
/// rows without an id.
pub fn rows_from_json(value: Value) -> Result<Vec<RawRow>> {
    let items = match value {
        Value::Array(items) => items,
        _ => {
            return Err(AttendanceError::UnsupportedInput(
                "JSON must be an array of records".to_string(),
            ))
        }
    };

    Ok(items
        .into_iter()
        .map(|item| {
            let mut row = RawRow::default();
            if let Value::Object(map) = item {
                for (key, value) in map {
                    row.set(&key, field_from_json(value));
                }
            }
            row
        })
        .collect())
}

fn field_from_json(value: Value) -> FieldValue {
    match value {
        Value::Null => FieldValue::Null,
        Value::Bool(b) => FieldValue::Bool(b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => FieldValue::Int(i),
            None => FieldValue::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => FieldValue::Text(s),
        other => FieldValue::Text(other.to_string()),
    }
}
