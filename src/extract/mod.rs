//! Format extractors.
//!
//! Each extractor reads one family of source files and fills a
//! [`ContentModel`]. Extractors share no state: a fatal problem with the
//! container is returned as an error, while a problem with one table,
//! page, slide, sheet or OCR pass is logged and leaves that part empty.

mod docx;
mod image;
mod ocr;
pub(crate) mod ooxml;
mod pdf;
mod pptx;
mod spreadsheet;

pub use docx::DocxExtractor;
pub use image::ImageExtractor;
pub use ocr::{OcrBackend, TesseractCli, OCR_UNAVAILABLE};
pub use pdf::{PdfExtractor, TableDetectorConfig};
pub use pptx::PptxExtractor;
pub use spreadsheet::SpreadsheetExtractor;

use crate::convert::{self, OutputFormat};
use crate::detect::SourceFormat;
use crate::error::Result;
use crate::model::ContentModel;
use std::path::Path;

/// Trait for format extractors.
///
/// Implement this trait to add support for a new source format.
pub trait FormatExtractor: Send + Sync {
    /// Get the name of this extractor.
    fn name(&self) -> &str;

    /// Get the supported file extensions for this extractor.
    ///
    /// Extensions should be lowercase without the leading dot (e.g., `["pdf"]`).
    fn supported_extensions(&self) -> &[&str];

    /// Read the file and build its content model.
    fn extract(&self, path: &Path) -> Result<ContentModel>;

    /// Source type label written into rendered output.
    fn file_type(&self, path: &Path) -> String {
        SourceFormat::from_path(path)
            .map(|format| format.file_type(path))
            .unwrap_or_else(|| self.name().to_string())
    }

    /// Output format used when the caller does not choose one.
    fn default_output(&self, path: &Path) -> OutputFormat {
        convert::default_output_for(path)
    }

    /// Check if this extractor supports the given extension.
    fn supports_extension(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.supported_extensions().iter().any(|e| *e == ext_lower)
    }
}
