//! Workbook and CSV extraction.
//!
//! CSV files become a single sheet named `Sheet1`; workbooks are read
//! through calamine with every cell rendered to a string. Rows that are
//! empty after rendering are dropped.

use super::FormatExtractor;
use crate::error::Result;
use crate::model::{ContentModel, FormatContent, Metadata, Sheet};
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;

const CSV_SHEET_NAME: &str = "Sheet1";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Extractor for spreadsheets and CSV files.
#[derive(Debug, Clone, Default)]
pub struct SpreadsheetExtractor {
    _private: (),
}

impl SpreadsheetExtractor {
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl FormatExtractor for SpreadsheetExtractor {
    fn name(&self) -> &str {
        "spreadsheet"
    }

    fn supported_extensions(&self) -> &[&str] {
        &["xlsx", "xlsm", "xls", "ods", "csv"]
    }

    fn extract(&self, path: &Path) -> Result<ContentModel> {
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"));

        let model = if is_csv {
            let bytes = std::fs::read(path)?;
            let sheet = Sheet::new(CSV_SHEET_NAME, read_csv(&bytes)?);
            let columns = sheet.column_count;
            let mut model = build_model(vec![sheet]);
            model.metadata.total_columns = Some(columns);
            model
        } else {
            build_model(read_workbook(path)?)
        };
        log::debug!("spreadsheet: {} sheets", model.sheets().len());
        Ok(model)
    }
}

/// Parse CSV bytes, replacing invalid UTF-8 and tolerating ragged rows.
fn read_csv(bytes: &[u8]) -> Result<Vec<Vec<String>>> {
    let lossy = String::from_utf8_lossy(bytes);
    let text = lossy.strip_prefix('\u{feff}').unwrap_or(lossy.as_ref());

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let row: Vec<String> = record?.iter().map(str::to_string).collect();
        if !is_blank(&row) {
            rows.push(row);
        }
    }
    Ok(rows)
}

fn read_workbook(path: &Path) -> Result<Vec<Sheet>> {
    let mut workbook = open_workbook_auto(path)?;
    let names = workbook.sheet_names().to_vec();

    let mut sheets = Vec::with_capacity(names.len());
    for name in names {
        match workbook.worksheet_range(&name) {
            Ok(range) => {
                // ranges start at the first used cell; keep column positions
                let offset = range.start().map(|(_, col)| col as usize).unwrap_or(0);
                let rows = range
                    .rows()
                    .map(|cells| {
                        std::iter::repeat(String::new())
                            .take(offset)
                            .chain(cells.iter().map(cell_to_string))
                            .collect::<Vec<_>>()
                    })
                    .filter(|row| !is_blank(row))
                    .collect();
                sheets.push(Sheet::new(name, rows));
            }
            Err(err) => {
                log::warn!("Skipping unreadable sheet '{}': {}", name, err);
            }
        }
    }
    Ok(sheets)
}

fn is_blank(row: &[String]) -> bool {
    row.iter().all(|cell| cell.is_empty())
}

/// Render one cell the way it reads in the sheet: whole numbers without a
/// decimal part, booleans as `True`/`False`, dates as `YYYY-MM-DD HH:MM:SS`.
pub(crate) fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_float(*f),
        Data::Bool(true) => "True".to_string(),
        Data::Bool(false) => "False".to_string(),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(value) => value.format(DATETIME_FORMAT).to_string(),
            None => format_float(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => e.to_string(),
    }
}

fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

fn build_model(sheets: Vec<Sheet>) -> ContentModel {
    let mut model = ContentModel::new(FormatContent::Spreadsheet { sheets: Vec::new() });
    model.text = sheets
        .iter()
        .flat_map(|sheet| sheet.rows.iter())
        .map(|row| row.join(", "))
        .collect::<Vec<_>>()
        .join("\n");
    model.metadata = Metadata {
        sheet_count: Some(sheets.len()),
        total_rows: Some(sheets.iter().map(|s| s.row_count).sum()),
        word_count: Some(model.word_count()),
        ..Metadata::default()
    };
    model.body = FormatContent::Spreadsheet { sheets };
    model
}
