//! Source format table and container sniffing.
//!
//! Extensions decide which extractor handles a file; the magic bytes at the
//! start of the file are checked so a misnamed file fails with a clear
//! message instead of a parser error from deep inside a format library.

use crate::convert::OutputFormat;
use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Source document families understood by the forward converters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    /// Word-processor document (`.docx`)
    WordDocument,
    /// PDF document
    Pdf,
    /// Slide deck (`.pptx`)
    Presentation,
    /// Workbook (`.xlsx`, `.xlsm`, `.xls`, `.ods`)
    Workbook,
    /// Comma-separated values
    Csv,
    /// Raster image
    Image,
}

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "tiff", "tif", "webp"];
const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "ods"];

impl SourceFormat {
    /// Resolve a format from a file extension (case-insensitive, no dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        match ext.as_str() {
            "docx" => Some(SourceFormat::WordDocument),
            "pdf" => Some(SourceFormat::Pdf),
            "pptx" => Some(SourceFormat::Presentation),
            "csv" => Some(SourceFormat::Csv),
            e if WORKBOOK_EXTENSIONS.contains(&e) => Some(SourceFormat::Workbook),
            e if IMAGE_EXTENSIONS.contains(&e) => Some(SourceFormat::Image),
            _ => None,
        }
    }

    /// Resolve a format from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// The label written into provenance headers and JSON `source.type`.
    ///
    /// Images carry their extension, e.g. `image_png`.
    pub fn file_type(&self, path: &Path) -> String {
        match self {
            SourceFormat::WordDocument => "word_document".to_string(),
            SourceFormat::Pdf => "pdf_document".to_string(),
            SourceFormat::Presentation => "powerpoint_presentation".to_string(),
            SourceFormat::Workbook => "excel_spreadsheet".to_string(),
            SourceFormat::Csv => "csv_spreadsheet".to_string(),
            SourceFormat::Image => {
                let ext = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("unknown")
                    .to_ascii_lowercase();
                format!("image_{}", ext)
            }
        }
    }

    /// The output format used when the caller does not ask for one.
    pub fn default_output(&self) -> OutputFormat {
        match self {
            SourceFormat::WordDocument | SourceFormat::Pdf | SourceFormat::Presentation => {
                OutputFormat::Markdown
            }
            SourceFormat::Workbook | SourceFormat::Csv | SourceFormat::Image => OutputFormat::Json,
        }
    }
}

/// Container kinds recognizable from leading bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Pdf,
    Zip,
    /// Legacy OLE compound file (`.xls`)
    Ole,
    Image,
    Unknown,
}

const PDF_MAGIC: &[u8] = b"%PDF-";
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Classify the container from the first bytes of a file.
pub fn sniff_bytes(data: &[u8]) -> Container {
    if data.starts_with(PDF_MAGIC) {
        Container::Pdf
    } else if data.starts_with(ZIP_MAGIC) {
        Container::Zip
    } else if data.starts_with(OLE_MAGIC) {
        Container::Ole
    } else if image::guess_format(data).is_ok() {
        Container::Image
    } else {
        Container::Unknown
    }
}

/// Classify the container of a file on disk.
pub fn sniff_path(path: &Path) -> Result<Container> {
    let mut file = File::open(path)?;
    let mut header = [0u8; 16];
    let mut filled = 0;
    while filled < header.len() {
        let n = file.read(&mut header[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(sniff_bytes(&header[..filled]))
}

/// Fail unless the file at `path` is the expected container.
pub fn expect_container(path: &Path, expected: Container) -> Result<()> {
    let found = sniff_path(path)?;
    if found == expected {
        Ok(())
    } else {
        Err(Error::UnknownFormat(format!(
            "expected a {:?} container, found {:?}",
            expected, found
        )))
    }
}

/// Every extension with a registered forward converter.
pub fn supported_extensions() -> Vec<&'static str> {
    let mut exts = vec!["docx", "pdf", "pptx", "csv"];
    exts.extend_from_slice(WORKBOOK_EXTENSIONS);
    exts.extend_from_slice(IMAGE_EXTENSIONS);
    exts
}
