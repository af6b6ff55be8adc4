use std::collections::HashMap;

use crate::CoachResult;
use crate::import::invalid_input_error;

/// One CSV data row keyed by trimmed, lower-cased header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based position among data rows (the header is row 0).
    pub row: i64,
    fields: HashMap<String, String>,
}

impl RawRow {
    pub fn new(row: i64, fields: HashMap<String, String>) -> Self {
        Self { row, fields }
    }

    /// Test and fixture helper; header names are normalized the same way as
    /// a parsed file.
    pub fn from_pairs(row: i64, pairs: &[(&str, &str)]) -> Self {
        let fields = pairs
            .iter()
            .map(|(header, value)| (normalize_header(header), (*value).to_string()))
            .collect::<HashMap<String, String>>();
        Self { row, fields }
    }

    /// First non-blank value among `headers`, trimmed.
    pub fn first_of(&self, headers: &[&str]) -> Option<&str> {
        headers
            .iter()
            .filter_map(|header| self.fields.get(*header))
            .map(|value| value.trim())
            .find(|value| !value.is_empty())
    }
}

pub fn parse_csv(content: &str) -> CoachResult<Vec<RawRow>> {
    let trimmed = content.trim_start_matches('\u{feff}').trim();
    if trimmed.is_empty() {
        return Err(invalid_input_error("Import source is empty."));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(trimmed.as_bytes());

    let headers = reader
        .headers()
        .map_err(|_| invalid_input_error("CSV header row is missing or unreadable."))?
        .iter()
        .map(normalize_header)
        .collect::<Vec<String>>();

    let mut rows = Vec::new();
    for (row_index, result_row) in reader.records().enumerate() {
        let record =
            result_row.map_err(|_| invalid_input_error("CSV rows are malformed or not UTF-8."))?;
        if record.iter().all(|value| value.trim().is_empty()) {
            continue;
        }

        let fields = headers
            .iter()
            .zip(record.iter())
            .filter(|(header, _)| !header.is_empty())
            .map(|(header, value)| (header.clone(), value.to_string()))
            .collect::<HashMap<String, String>>();
        rows.push(RawRow::new((row_index as i64) + 1, fields));
    }

    if rows.is_empty() {
        return Err(invalid_input_error("CSV has a header row but no data rows."));
    }

    Ok(rows)
}

fn normalize_header(value: &str) -> String {
    value.trim().to_lowercase()
}
