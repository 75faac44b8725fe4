//! PDF extraction.
//!
//! Pages are read in order. Each page's text comes from its content stream
//! (spans grouped into lines); lopdf's plain-text extraction is the
//! fallback when the walker finds nothing. Tables are detected from the
//! same spans and tagged with their page.

mod backend;
mod spans;
mod tables;

pub use tables::TableDetectorConfig;

use backend::{LopdfBackend, PdfBackend};
use tables::TableDetector;

use std::path::Path;

use unicode_normalization::UnicodeNormalization;

use super::FormatExtractor;
use crate::detect::{expect_container, Container};
use crate::error::Result;
use crate::model::{ContentModel, FormatContent, Metadata, PdfPage};

/// Extractor for PDF documents.
#[derive(Debug, Clone, Default)]
pub struct PdfExtractor {
    detector: TableDetector,
}

impl PdfExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom table detector configuration.
    pub fn with_table_config(config: TableDetectorConfig) -> Self {
        Self {
            detector: TableDetector::with_config(config),
        }
    }

    /// Build the content model from an already loaded backend.
    pub(crate) fn extract_from<B: PdfBackend>(&self, backend: &B) -> ContentModel {
        let mut pages = Vec::new();
        for (number, page_id) in backend.pages() {
            let mut page = PdfPage::new(number);
            match spans::page_spans(backend, page_id) {
                Ok(page_spans) => {
                    page.tables = self
                        .detector
                        .detect(&page_spans)
                        .into_iter()
                        .map(|table| table.on_page(number))
                        .collect();
                    page.text = spans::spans_to_text(page_spans);
                }
                Err(err) => log::warn!("Could not read content of page {}: {}", number, err),
            }

            if page.text.trim().is_empty() {
                page.text = match backend.plain_text(number) {
                    Ok(text) => text.trim().to_string(),
                    Err(err) => {
                        log::debug!("No fallback text for page {}: {}", number, err);
                        String::new()
                    }
                };
            }
            page.text = page.text.nfc().collect();
            pages.push(page);
        }

        let mut model = ContentModel::new(FormatContent::Pdf { pages: Vec::new() });
        model.text = pages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        model.tables = pages.iter().flat_map(|p| p.tables.iter().cloned()).collect();
        model.metadata = Metadata {
            page_count: Some(pages.len()),
            table_count: Some(model.tables.len()),
            word_count: Some(model.word_count()),
            ..Metadata::default()
        };
        model.body = FormatContent::Pdf { pages };
        model
    }
}

impl FormatExtractor for PdfExtractor {
    fn name(&self) -> &str {
        "pdf"
    }

    fn supported_extensions(&self) -> &[&str] {
        &["pdf"]
    }

    fn extract(&self, path: &Path) -> Result<ContentModel> {
        expect_container(path, Container::Pdf)?;
        let backend = LopdfBackend::load_file(path)?;
        let model = self.extract_from(&backend);
        log::debug!(
            "pdf: {} pages, {} tables",
            model.pages().len(),
            model.tables.len()
        );
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::backend::{ContentOp, PageId, PdfValue};
    use super::*;
    use crate::error::Error;
    use std::collections::BTreeMap;

    /// Two pages: the first draws text, the second has no text operators
    /// but a plain-text fallback.
    struct TwoPages;

    impl PdfBackend for TwoPages {
        fn pages(&self) -> BTreeMap<u32, PageId> {
            BTreeMap::from([(1, (10, 0)), (2, (20, 0))])
        }
        fn page_content(&self, page: PageId) -> Result<Vec<u8>> {
            match page {
                (10, 0) => Ok(b"ops".to_vec()),
                _ => Err(Error::Pdf("broken stream".to_string())),
            }
        }
        fn decode_content(&self, _data: &[u8]) -> Result<Vec<ContentOp>> {
            let op = |operator: &str, operands: Vec<PdfValue>| ContentOp {
                operator: operator.to_string(),
                operands,
            };
            Ok(vec![
                op("BT", vec![]),
                op("Td", vec![PdfValue::Integer(72), PdfValue::Integer(700)]),
                // decomposed e + combining acute
                op("Tj", vec![PdfValue::Str("Cafe\u{301}".as_bytes().to_vec())]),
                op("ET", vec![]),
            ])
        }
        fn decode_text(&self, _page: PageId, _font: &[u8], bytes: &[u8]) -> String {
            String::from_utf8_lossy(bytes).into_owned()
        }
        fn plain_text(&self, page_number: u32) -> Result<String> {
            Ok(format!("  fallback {}\n", page_number))
        }
    }

    #[test]
    fn test_pages_text_and_fallback() {
        let model = PdfExtractor::new().extract_from(&TwoPages);
        let pages = model.pages();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].page_number, 1);
        assert_eq!(pages[0].text, "Caf\u{e9}");
        assert_eq!(pages[1].text, "fallback 2");
        assert_eq!(model.text, "Caf\u{e9}\n\nfallback 2");
        assert_eq!(model.metadata.page_count, Some(2));
        assert_eq!(model.metadata.table_count, Some(0));
        assert_eq!(model.metadata.word_count, Some(3));
    }
}
