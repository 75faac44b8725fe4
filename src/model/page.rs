//! PDF page content.

use super::Table;
use serde::Serialize;

/// Text and tables of one PDF page.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PdfPage {
    /// 1-based page number
    pub page_number: u32,

    /// Page text, empty when the page has none
    pub text: String,

    /// Tables detected on the page
    pub tables: Vec<Table>,
}

impl PdfPage {
    pub fn new(page_number: u32) -> Self {
        Self {
            page_number,
            ..Default::default()
        }
    }
}
