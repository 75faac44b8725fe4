//! Spreadsheet content.

use serde::Serialize;
use serde_json::{Map, Value};

/// One worksheet (or the single implicit sheet of a CSV file).
#[derive(Debug, Clone, Default, Serialize)]
pub struct Sheet {
    pub name: String,

    /// First non-empty row
    pub headers: Vec<String>,

    /// Non-empty rows, header row included
    pub rows: Vec<Vec<String>>,

    pub row_count: usize,
    pub column_count: usize,
}

impl Sheet {
    /// Build a sheet from its non-empty rows.
    pub fn new(name: impl Into<String>, rows: Vec<Vec<String>>) -> Self {
        let headers = rows.first().cloned().unwrap_or_default();
        let column_count = headers.len();
        Self {
            name: name.into(),
            headers,
            row_count: rows.len(),
            column_count,
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Data rows keyed by header name.
    ///
    /// Empty header names are dropped as keys and missing trailing cells
    /// become empty strings. `None` unless the sheet has headers and at
    /// least one data row.
    pub fn records(&self) -> Option<Vec<Map<String, Value>>> {
        if self.headers.is_empty() || self.rows.len() < 2 {
            return None;
        }
        let records = self.rows[1..]
            .iter()
            .map(|row| {
                self.headers
                    .iter()
                    .enumerate()
                    .filter(|(_, header)| !header.is_empty())
                    .map(|(i, header)| {
                        let cell = row.get(i).cloned().unwrap_or_default();
                        (header.clone(), Value::String(cell))
                    })
                    .collect()
            })
            .collect();
        Some(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_records_zip_headers() {
        let sheet = Sheet::new("Sheet1", rows(&[&["Name", "Age"], &["Ann", "30"]]));
        let records = sheet.records().unwrap();
        assert_eq!(
            Value::Array(records.into_iter().map(Value::Object).collect()),
            json!([{"Name": "Ann", "Age": "30"}])
        );
    }

    #[test]
    fn test_records_skip_blank_header_and_pad() {
        let sheet = Sheet::new("S", rows(&[&["Name", "", "City"], &["Bo"]]));
        let records = sheet.records().unwrap();
        assert_eq!(Value::Object(records[0].clone()), json!({"Name": "Bo", "City": ""}));
    }

    #[test]
    fn test_records_need_data_rows() {
        let sheet = Sheet::new("S", rows(&[&["Only", "Header"]]));
        assert!(sheet.records().is_none());
        assert_eq!(sheet.row_count, 1);
        assert_eq!(sheet.column_count, 2);
    }
}
