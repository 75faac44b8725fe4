//! Table type.

use serde::Serialize;

/// A table of plain strings.
///
/// When `headers` is non-empty it is also `rows[0]`; use [`Table::body_rows`]
/// to iterate the data without doubling the header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    /// Header cells (empty when the table has no rows)
    pub headers: Vec<String>,

    /// All rows, header row included
    pub rows: Vec<Vec<String>>,

    /// Page the table was found on (PDF only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

impl Table {
    /// Build a table whose first row is the header.
    pub fn from_rows(rows: Vec<Vec<String>>) -> Self {
        let headers = rows.first().cloned().unwrap_or_default();
        Self {
            headers,
            rows,
            page: None,
        }
    }

    /// Tag the table with the page it came from.
    pub fn on_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Rows after the header (all rows when there is no header).
    pub fn body_rows(&self) -> &[Vec<String>] {
        if self.headers.is_empty() {
            &self.rows
        } else {
            self.rows.get(1..).unwrap_or(&[])
        }
    }

    /// Number of columns, taken from the header or the widest row.
    pub fn column_count(&self) -> usize {
        if self.headers.is_empty() {
            self.rows.iter().map(Vec::len).max().unwrap_or(0)
        } else {
            self.headers.len()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Text of all cells, row by row.
    pub fn plain_text(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.join(" "))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_from_rows_duplicates_header() {
        let table = Table::from_rows(vec![row(&["A", "B"]), row(&["1", "2"])]);
        assert_eq!(table.headers, row(&["A", "B"]));
        assert_eq!(table.rows[0], table.headers);
        assert_eq!(table.body_rows(), &[row(&["1", "2"])]);
        assert_eq!(table.column_count(), 2);
    }

    #[test]
    fn test_empty_table() {
        let table = Table::from_rows(Vec::new());
        assert!(table.is_empty());
        assert!(table.headers.is_empty());
        assert!(table.body_rows().is_empty());
    }

    #[test]
    fn test_page_only_serialized_when_set() {
        let table = Table::from_rows(vec![row(&["x"])]);
        let json = serde_json::to_value(&table).unwrap();
        assert!(json.get("page").is_none());

        let json = serde_json::to_value(table.on_page(3)).unwrap();
        assert_eq!(json["page"], 3);
    }
}
