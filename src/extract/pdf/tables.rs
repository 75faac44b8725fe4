//! Table detection from text alignment.
//!
//! Rows are baselines; columns are left edges that line up across rows.
//! A run of consecutive rows whose spans sit on those edges becomes a
//! table. No ruling lines are needed.

use std::collections::{HashMap, HashSet};

use super::spans::{reading_order, TextSpan};
use crate::model::Table;

/// Width of the buckets left edges are snapped into, in points.
const EDGE_BUCKET: f32 = 5.0;
/// How far a span may sit from a column edge and still count as aligned.
const ALIGN_TOLERANCE: f32 = 5.0;

/// Table detector configuration.
#[derive(Debug, Clone)]
pub struct TableDetectorConfig {
    /// Minimum number of rows to consider as table
    pub min_rows: usize,
    /// Minimum number of columns to consider as table
    pub min_columns: usize,
    /// Above this many columns the "table" is usually justified prose
    pub max_columns: usize,
    /// Y tolerance for grouping spans into rows (fraction of font size)
    pub y_tolerance_factor: f32,
    /// Share of a row's spans that must sit on column edges
    pub min_alignment_ratio: f32,
    /// Minimum gap between columns (points)
    pub min_column_gap: f32,
}

impl Default for TableDetectorConfig {
    fn default() -> Self {
        Self {
            min_rows: 2,
            min_columns: 2,
            max_columns: 6,
            y_tolerance_factor: 0.4,
            min_alignment_ratio: 0.3,
            min_column_gap: 15.0,
        }
    }
}

#[derive(Debug, Clone)]
struct Row {
    spans: Vec<TextSpan>,
}

/// Finds tables in the spans of one page.
#[derive(Debug, Clone, Default)]
pub struct TableDetector {
    config: TableDetectorConfig,
}

impl TableDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: TableDetectorConfig) -> Self {
        Self { config }
    }

    /// Detect tables; the first row of each becomes its header.
    pub fn detect(&self, spans: &[TextSpan]) -> Vec<Table> {
        if spans.len() < self.config.min_rows * self.config.min_columns {
            return Vec::new();
        }

        let rows = self.group_into_rows(spans);
        if rows.len() < self.config.min_rows {
            return Vec::new();
        }

        let columns = self.detect_columns(&rows);
        if columns.len() < self.config.min_columns {
            return Vec::new();
        }

        let mut tables = Vec::new();
        for (start, end) in self.find_table_regions(&rows, &columns) {
            let region = &rows[start..=end];
            let region_columns = self.detect_columns(region);

            if region_columns.len() < self.config.min_columns {
                continue;
            }
            if region_columns.len() > self.config.max_columns {
                log::debug!(
                    "Skipping table region with {} columns",
                    region_columns.len()
                );
                continue;
            }
            if is_list_pattern(region, region_columns.len()) {
                log::debug!("Skipping table region that reads as a list");
                continue;
            }

            tables.push(Table::from_rows(self.cells(region, &region_columns)));
        }
        tables
    }

    fn group_into_rows(&self, spans: &[TextSpan]) -> Vec<Row> {
        let mut sorted = spans.to_vec();
        sorted.sort_by(reading_order);

        let mut rows: Vec<Row> = Vec::new();
        let mut current: Vec<TextSpan> = Vec::new();
        let mut current_y: Option<f32> = None;

        for span in sorted {
            let tolerance = span.font_size * self.config.y_tolerance_factor;
            match current_y {
                Some(y) if (span.y - y).abs() <= tolerance => current.push(span),
                _ => {
                    if !current.is_empty() {
                        rows.push(Row {
                            spans: std::mem::take(&mut current),
                        });
                    }
                    current_y = Some(span.y);
                    current.push(span);
                }
            }
        }
        if !current.is_empty() {
            rows.push(Row { spans: current });
        }
        rows
    }

    /// Left edges shared by enough rows, merged when closer than the
    /// minimum column gap. Rows with a single span only count when too
    /// few rows have several.
    fn detect_columns(&self, rows: &[Row]) -> Vec<f32> {
        let multi: Vec<&Row> = rows.iter().filter(|r| r.spans.len() >= 2).collect();
        let sample: Vec<&Row> = if multi.len() >= self.config.min_rows {
            multi
        } else {
            rows.iter().collect()
        };
        if sample.is_empty() {
            return Vec::new();
        }

        let mut edge_counts: HashMap<i32, usize> = HashMap::new();
        for row in &sample {
            let buckets: HashSet<i32> = row
                .spans
                .iter()
                .map(|s| (s.x / EDGE_BUCKET).round() as i32)
                .collect();
            for bucket in buckets {
                *edge_counts.entry(bucket).or_insert(0) += 1;
            }
        }

        let min_occurrences =
            ((sample.len() as f32 * self.config.min_alignment_ratio) as usize).max(2);
        let mut edges: Vec<f32> = edge_counts
            .into_iter()
            .filter(|(_, count)| *count >= min_occurrences)
            .map(|(bucket, _)| bucket as f32 * EDGE_BUCKET)
            .collect();
        edges.sort_by(|a, b| a.total_cmp(b));

        let mut merged: Vec<f32> = Vec::new();
        for edge in edges {
            match merged.last() {
                Some(last) if edge - last < self.config.min_column_gap => {}
                _ => merged.push(edge),
            }
        }
        merged
    }

    fn find_table_regions(&self, rows: &[Row], columns: &[f32]) -> Vec<(usize, usize)> {
        let mut regions = Vec::new();
        let mut start: Option<usize> = None;

        for (i, row) in rows.iter().enumerate() {
            if alignment_score(row, columns) >= self.config.min_alignment_ratio {
                start.get_or_insert(i);
            } else if let Some(s) = start.take() {
                if i - s >= self.config.min_rows {
                    regions.push((s, i - 1));
                }
            }
        }
        if let Some(s) = start {
            if rows.len() - s >= self.config.min_rows {
                regions.push((s, rows.len() - 1));
            }
        }
        regions
    }

    fn cells(&self, rows: &[Row], columns: &[f32]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| {
                let mut cells: Vec<Vec<&str>> = vec![Vec::new(); columns.len()];
                for span in &row.spans {
                    let col = column_for(span.x, columns);
                    cells[col].push(span.text.trim());
                }
                cells.into_iter().map(|parts| parts.join(" ")).collect()
            })
            .collect()
    }
}

fn alignment_score(row: &Row, columns: &[f32]) -> f32 {
    if row.spans.is_empty() || columns.is_empty() {
        return 0.0;
    }
    let aligned = row
        .spans
        .iter()
        .filter(|span| columns.iter().any(|col| (span.x - col).abs() <= ALIGN_TOLERANCE))
        .count();
    aligned as f32 / row.spans.len() as f32
}

/// The column whose edge is the last one at or left of `x` (with slack),
/// else the nearest.
fn column_for(x: f32, columns: &[f32]) -> usize {
    let slack = 10.0;
    if let Some(i) = columns.iter().rposition(|&edge| x >= edge - slack) {
        return i;
    }
    columns
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| (x - **a).abs().total_cmp(&(x - **b).abs()))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Numbered or bulleted lists split marker and text into separate spans,
/// which look like a two-column table.
fn is_list_pattern(rows: &[Row], column_count: usize) -> bool {
    if column_count < 2 || rows.is_empty() {
        return false;
    }

    let mut bullets = 0;
    let mut numbers = 0;
    for row in rows {
        let first = row.spans.iter().min_by(|a, b| a.x.total_cmp(&b.x));
        if let Some(span) = first {
            let text = span.text.trim();
            if is_bullet_marker(text) {
                bullets += 1;
            } else if is_number_marker(text) {
                numbers += 1;
            }
        }
    }

    let total = rows.len() as f32;
    bullets as f32 / total >= 0.5 || (column_count == 2 && (bullets + numbers) as f32 / total >= 0.5)
}

fn is_bullet_marker(text: &str) -> bool {
    matches!(
        text.trim(),
        "-" | "\u{2013}" | "\u{2014}" | "\u{2022}" | "\u{00B7}" | "*" | "\u{25CB}" | "\u{25AA}"
            | "\u{25E6}" | "\u{25B8}" | "\u{25BA}" | "\u{25A0}" | "\u{25CF}" | "\u{25A1}"
            | "\u{25C6}" | "\u{25B6}" | "\u{27A4}"
    )
}

/// `1.`, `12)`, a bare `3`, or a letter marker like `a.`.
fn is_number_marker(text: &str) -> bool {
    let cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return false;
    }
    if cleaned.parse::<u32>().is_ok() {
        return true;
    }
    let digits = cleaned.chars().take_while(char::is_ascii_digit).count();
    let suffix = &cleaned[digits..];
    if digits > 0 && (suffix == "." || suffix == ")") {
        return true;
    }
    let chars: Vec<char> = cleaned.chars().collect();
    chars.len() == 2 && chars[0].is_alphabetic() && (chars[1] == '.' || chars[1] == ')')
}
