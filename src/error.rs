//! Error types for the aiready library.

use std::io;
use thiserror::Error;

/// Result type alias for aiready operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while converting documents.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// No converter is registered for the file extension.
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// The file content does not match the container its extension claims.
    #[error("Unknown file format: {0}")]
    UnknownFormat(String),

    /// The ZIP container of an Office document could not be read.
    #[error("Archive error: {0}")]
    Archive(String),

    /// Malformed XML inside an Office document.
    #[error("XML error: {0}")]
    Xml(String),

    /// A required part is missing from an Office package.
    #[error("Missing package part: {0}")]
    MissingPart(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    Pdf(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// Error reading a workbook or CSV file.
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    /// Error decoding or encoding an image.
    #[error("Image error: {0}")]
    Image(String),

    /// Text recognition failed.
    #[error("OCR error: {0}")]
    Ocr(String),

    /// Error during rendering (Markdown, JSON, DOCX).
    #[error("Rendering error: {0}")]
    Render(String),

    /// A fatal extraction error, labeled with the file that caused it.
    #[error("Failed to convert {filename}: {source}")]
    Conversion {
        filename: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Attach the source filename to a fatal extraction error.
    pub fn in_file(self, filename: impl Into<String>) -> Self {
        match self {
            err @ Error::Conversion { .. } => err,
            err => Error::Conversion {
                filename: filename.into(),
                source: Box::new(err),
            },
        }
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::Pdf(err.to_string()),
        }
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            zip::result::ZipError::FileNotFound => Error::MissingPart(err.to_string()),
            _ => Error::Archive(err.to_string()),
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Xml(err.to_string())
    }
}

impl From<calamine::Error> for Error {
    fn from(err: calamine::Error) -> Self {
        Error::Spreadsheet(err.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Spreadsheet(err.to_string())
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::Image(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Render(err.to_string())
    }
}
