//! # aiready
//!
//! Convert office documents, PDFs, spreadsheets and images into
//! AI-ready Markdown or JSON, and Markdown back into Word documents.
//!
//! ## Quick Start
//!
//! ```no_run
//! use aiready::{to_json, to_markdown};
//!
//! fn main() -> aiready::Result<()> {
//!     // Word, PDF, PowerPoint, spreadsheet or image in, Markdown out
//!     let markdown = to_markdown("report.docx")?;
//!     println!("{}", markdown);
//!
//!     // Same content as a JSON envelope
//!     let json = to_json("figures.xlsx")?;
//!     println!("{}", json);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **One content model**: every format is extracted into [`ContentModel`]
//!   and rendered by the same Markdown and JSON renderers
//! - **Extract once**: a [`Converter`] caches its extraction, so Markdown
//!   and JSON come from a single pass over the source
//! - **Images**: OCR through Tesseract and optional vision analysis by
//!   OpenAI, Anthropic or Gemini (`vision` feature)
//! - **Reverse conversion**: Markdown to `.docx`, dropping the provenance
//!   header written by forward conversion
//! - **Batches**: independent files are converted in parallel with Rayon

pub mod convert;
pub mod detect;
pub mod error;
pub mod extract;
pub mod model;
pub mod render;
pub mod reverse;
pub mod vision;

// Re-export commonly used types
pub use convert::{
    ConvertOptions, ConvertResult, Converter, ConverterRegistry, OcrMode, OutputFormat,
};
pub use detect::SourceFormat;
pub use error::{Error, Result};
pub use extract::{FormatExtractor, OcrBackend, TableDetectorConfig};
pub use model::{ContentModel, FormatContent, Heading, ImageContent, Metadata, Paragraph, Table};
pub use render::JsonFormat;
pub use reverse::{MarkdownToDocx, ReverseConverter, ReverseRegistry, ReverseResult};
pub use vision::{ProviderKind, VisionAnalysis, VisionConfig};

use std::path::Path;

/// Extract the content model of a file with default options.
///
/// # Example
///
/// ```no_run
/// let model = aiready::extract("slides.pptx").unwrap();
/// println!("{} slides", model.metadata.slide_count.unwrap_or(0));
/// ```
pub fn extract<P: AsRef<Path>>(path: P) -> Result<ContentModel> {
    let converter = ConverterRegistry::with_options(ConvertOptions::from_env()).open(path.as_ref())?;
    converter.extract().cloned()
}

/// Convert a file to Markdown with default options.
///
/// # Example
///
/// ```no_run
/// let markdown = aiready::to_markdown("paper.pdf").unwrap();
/// std::fs::write("paper_AI_converter.md", markdown).unwrap();
/// ```
pub fn to_markdown<P: AsRef<Path>>(path: P) -> Result<String> {
    AiReady::new().convert(path, Some(OutputFormat::Markdown)).map(|r| r.content)
}

/// Convert a file to pretty-printed JSON with default options.
pub fn to_json<P: AsRef<Path>>(path: P) -> Result<String> {
    AiReady::new().convert(path, Some(OutputFormat::Json)).map(|r| r.content)
}

/// Convert a file to the output format its type defaults to: JSON for
/// spreadsheets and images, Markdown for everything else.
pub fn convert_file<P: AsRef<Path>>(path: P) -> Result<ConvertResult> {
    AiReady::new().convert(path, None)
}

/// Convert Markdown text into `.docx` bytes.
///
/// # Example
///
/// ```no_run
/// let docx = aiready::markdown_to_docx("# Notes\n\n- one\n- two\n").unwrap();
/// std::fs::write("notes_converted.docx", docx).unwrap();
/// ```
pub fn markdown_to_docx(markdown: &str) -> Result<Vec<u8>> {
    MarkdownToDocx::new().to_bytes(markdown)
}

/// Builder for configuring and running conversions.
///
/// Vision settings start from the environment (see [`VisionConfig::from_env`]).
///
/// # Example
///
/// ```no_run
/// use aiready::{AiReady, OutputFormat};
///
/// let result = AiReady::new()
///     .without_vision()
///     .without_ocr()
///     .compact_json()
///     .convert("scan.png", Some(OutputFormat::Json))?;
/// std::fs::write(&result.filename, result.content)?;
/// # Ok::<(), aiready::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct AiReady {
    options: ConvertOptions,
}

impl AiReady {
    /// Create a builder with options read from the environment.
    pub fn new() -> Self {
        Self {
            options: ConvertOptions::from_env(),
        }
    }

    /// Start from explicit options.
    pub fn with_options(options: ConvertOptions) -> Self {
        Self { options }
    }

    /// Never call a vision provider.
    pub fn without_vision(mut self) -> Self {
        self.options.vision = VisionConfig::disabled();
        self
    }

    /// Use a specific vision provider, e.g. `anthropic`.
    pub fn with_vision_provider(mut self, provider: impl Into<String>) -> Self {
        self.options.vision = self.options.vision.with_provider(provider);
        self
    }

    /// Skip OCR on images.
    pub fn without_ocr(mut self) -> Self {
        self.options.ocr = OcrMode::Disabled;
        self
    }

    /// Emit JSON without indentation.
    pub fn compact_json(mut self) -> Self {
        self.options.json_format = JsonFormat::Compact;
        self
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Registry with every built-in extractor configured by this builder.
    pub fn registry(&self) -> ConverterRegistry {
        ConverterRegistry::with_options(self.options.clone())
    }

    /// Convert one file; `None` picks the source's default format.
    pub fn convert<P: AsRef<Path>>(
        &self,
        path: P,
        format: Option<OutputFormat>,
    ) -> Result<ConvertResult> {
        self.registry().convert(path.as_ref(), format)
    }
}

impl Default for AiReady {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_options() {
        let builder = AiReady::with_options(ConvertOptions::default())
            .without_vision()
            .without_ocr()
            .compact_json();
        assert!(!builder.options().vision.enabled);
        assert_eq!(builder.options().ocr, OcrMode::Disabled);
        assert_eq!(builder.options().json_format, JsonFormat::Compact);
    }

    #[test]
    fn test_builder_provider() {
        let builder = AiReady::with_options(ConvertOptions::default()).with_vision_provider("gemini");
        assert_eq!(builder.options().vision.provider, "gemini");
    }

    #[test]
    fn test_registry_supports_all_forward_formats() {
        let registry = AiReady::with_options(ConvertOptions::default()).registry();
        for ext in detect::supported_extensions() {
            assert!(registry.supports(ext), "{}", ext);
        }
    }

    #[test]
    fn test_unsupported_extension() {
        let err = to_markdown("legacy.doc").unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }

    #[test]
    fn test_markdown_to_docx_is_a_zip() {
        let bytes = markdown_to_docx("# Hi\n\ntext").unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }
}
