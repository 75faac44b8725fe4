//! The content model and its summary statistics.

use super::{Heading, ImageContent, Paragraph, PdfPage, Sheet, Slide, Table};
use serde::Serialize;

/// Extracted content of one source document.
#[derive(Debug, Clone, Serialize)]
pub struct ContentModel {
    /// Flattened text, blocks joined by blank lines
    pub text: String,

    pub paragraphs: Vec<Paragraph>,

    pub headings: Vec<Heading>,

    pub tables: Vec<Table>,

    /// Fields specific to the source family
    #[serde(flatten)]
    pub body: FormatContent,

    /// Summary statistics, emitted beside the content at render time
    #[serde(skip)]
    pub metadata: Metadata,
}

impl ContentModel {
    /// Create an empty model for the given source family.
    pub fn new(body: FormatContent) -> Self {
        Self {
            text: String::new(),
            paragraphs: Vec::new(),
            headings: Vec::new(),
            tables: Vec::new(),
            body,
            metadata: Metadata::default(),
        }
    }

    /// Number of whitespace-separated tokens in `text`.
    pub fn word_count(&self) -> usize {
        word_count(&self.text)
    }

    pub fn pages(&self) -> &[PdfPage] {
        match &self.body {
            FormatContent::Pdf { pages } => pages,
            _ => &[],
        }
    }

    pub fn slides(&self) -> &[Slide] {
        match &self.body {
            FormatContent::Deck { slides, .. } => slides,
            _ => &[],
        }
    }

    pub fn sheets(&self) -> &[Sheet] {
        match &self.body {
            FormatContent::Spreadsheet { sheets } => sheets,
            _ => &[],
        }
    }

    pub fn image(&self) -> Option<&ImageContent> {
        match &self.body {
            FormatContent::Image(image) => Some(image),
            _ => None,
        }
    }
}

/// Format-specific extension of the content model.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum FormatContent {
    /// Word-processor body; `order` interleaves paragraphs and tables as
    /// they appear in the document.
    Document {
        #[serde(skip)]
        order: Vec<BlockRef>,
    },
    Pdf {
        pages: Vec<PdfPage>,
    },
    Deck {
        slides: Vec<Slide>,
        total_slides: usize,
    },
    Spreadsheet {
        sheets: Vec<Sheet>,
    },
    Image(ImageContent),
}

/// Position of a body element in the document's paragraph or table list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockRef {
    Paragraph(usize),
    Table(usize),
}

/// Flat summary statistics; only the fields a format fills are emitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Metadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paragraph_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slide_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_rows: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_columns: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_count: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocr_word_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base64_size_bytes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vision_analysis_success: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vision_provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vision_model: Option<String>,
}

/// Whitespace-separated token count.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_word_count() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("  one\ttwo\n\nthree "), 3);
    }

    #[test]
    fn test_document_body_adds_no_keys() {
        let mut model = ContentModel::new(FormatContent::Document {
            order: vec![BlockRef::Paragraph(0)],
        });
        model.text = "Hello".to_string();
        model.paragraphs.push(Paragraph::new("Hello", "Normal"));

        let json = serde_json::to_value(&model).unwrap();
        assert_eq!(
            json,
            json!({
                "text": "Hello",
                "paragraphs": [{"text": "Hello", "style": "Normal"}],
                "headings": [],
                "tables": []
            })
        );
    }

    #[test]
    fn test_pdf_body_flattens_pages() {
        let model = ContentModel::new(FormatContent::Pdf {
            pages: vec![PdfPage::new(1)],
        });
        let json = serde_json::to_value(&model).unwrap();
        assert_eq!(json["pages"][0]["page_number"], 1);
        assert_eq!(model.pages().len(), 1);
        assert!(model.slides().is_empty());
    }

    #[test]
    fn test_metadata_skips_unset() {
        let metadata = Metadata {
            page_count: Some(2),
            word_count: Some(10),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&metadata).unwrap(),
            json!({"page_count": 2, "word_count": 10})
        );
    }
}
