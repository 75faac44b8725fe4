//! Conversion entry points.
//!
//! A [`ConverterRegistry`] maps file extensions to [`FormatExtractor`]s and
//! hands out one [`Converter`] per source file. A converter extracts its
//! file at most once and renders the cached content model as often as it
//! is asked.
//!
//! # Example
//!
//! ```no_run
//! use aiready::convert::{ConvertOptions, ConverterRegistry, OutputFormat};
//! use std::path::Path;
//!
//! fn main() -> aiready::Result<()> {
//!     let registry = ConverterRegistry::with_options(ConvertOptions::from_env());
//!     let converter = registry.open(Path::new("report.docx"))?;
//!
//!     let markdown = converter.to_markdown()?;
//!     let json = converter.to_json()?;
//!     println!("{}\n{}", markdown, json);
//!     println!("{}", converter.output_filename(OutputFormat::Markdown));
//!     Ok(())
//! }
//! ```

use crate::detect::SourceFormat;
use crate::error::{Error, Result};
use crate::extract::{
    DocxExtractor, FormatExtractor, ImageExtractor, PdfExtractor, PptxExtractor,
    SpreadsheetExtractor,
};
use crate::model::ContentModel;
use crate::render::{self, JsonFormat, SourceInfo};
use crate::vision::VisionConfig;
use once_cell::sync::OnceCell;
use rayon::prelude::*;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

/// Whether image conversion runs text recognition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OcrMode {
    /// Use the `tesseract` binary when it is installed
    #[default]
    Auto,
    /// Never run OCR; the text field carries an "unavailable" marker
    Disabled,
}

/// Options for document conversion.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Vision analysis settings for images
    pub vision: VisionConfig,

    /// Text recognition for images
    pub ocr: OcrMode,

    /// JSON layout
    pub json_format: JsonFormat,
}

impl ConvertOptions {
    /// Create new conversion options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options with the vision section read from the environment.
    pub fn from_env() -> Self {
        Self {
            vision: VisionConfig::from_env(),
            ..Self::default()
        }
    }

    /// Set vision analysis options.
    pub fn with_vision(mut self, vision: VisionConfig) -> Self {
        self.vision = vision;
        self
    }

    /// Set OCR mode.
    pub fn with_ocr(mut self, ocr: OcrMode) -> Self {
        self.ocr = ocr;
        self
    }

    /// Set JSON layout.
    pub fn with_json_format(mut self, format: JsonFormat) -> Self {
        self.json_format = format;
        self
    }
}

/// Output format for forward conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    /// Markdown format
    #[default]
    Markdown,

    /// JSON structure
    Json,
}

impl OutputFormat {
    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Json => "json",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "text/markdown",
            OutputFormat::Json => "application/json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "md" | "markdown" => Ok(OutputFormat::Markdown),
            "json" => Ok(OutputFormat::Json),
            other => Err(Error::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Result of converting one file.
#[derive(Debug, Clone)]
pub struct ConvertResult {
    /// Rendered Markdown or JSON
    pub content: String,

    /// Suggested output file name
    pub filename: String,

    pub format: OutputFormat,

    /// MIME type of the output
    pub mime_type: &'static str,
}

impl ConvertResult {
    /// Get content length in bytes.
    pub fn content_len(&self) -> usize {
        self.content.len()
    }
}

/// Converts one source file; the extraction runs once and is cached.
pub struct Converter {
    path: PathBuf,
    filename: String,
    extractor: Arc<dyn FormatExtractor>,
    json_format: JsonFormat,
    content: OnceCell<ContentModel>,
}

impl Converter {
    pub fn new(
        path: impl Into<PathBuf>,
        extractor: Arc<dyn FormatExtractor>,
        options: &ConvertOptions,
    ) -> Self {
        let path = path.into();
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            path,
            filename,
            extractor,
            json_format: options.json_format,
            content: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Source file name without directories.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Source type label, e.g. `pdf_document`.
    pub fn file_type(&self) -> String {
        self.extractor.file_type(&self.path)
    }

    /// Output format used when none is requested.
    pub fn default_format(&self) -> OutputFormat {
        self.extractor.default_output(&self.path)
    }

    /// Extract the content model, parsing the source only on the first call.
    pub fn extract(&self) -> Result<&ContentModel> {
        self.content.get_or_try_init(|| {
            log::debug!("Extracting {} with {}", self.filename, self.extractor.name());
            self.extractor
                .extract(&self.path)
                .map_err(|e| e.in_file(&self.filename))
        })
    }

    fn source_info(&self) -> SourceInfo {
        SourceInfo::new(&self.filename, self.file_type())
    }

    /// Render Markdown with the provenance header.
    pub fn to_markdown(&self) -> Result<String> {
        let model = self.extract()?;
        Ok(render::to_markdown(model, &self.source_info()))
    }

    /// Render the JSON envelope.
    pub fn to_json(&self) -> Result<String> {
        let model = self.extract()?;
        render::to_json(model, &self.source_info(), self.json_format)
    }

    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Markdown => self.to_markdown(),
            OutputFormat::Json => self.to_json(),
        }
    }

    /// `<stem>_AI_converter.<md|json>`
    pub fn output_filename(&self, format: OutputFormat) -> String {
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        format!("{}_AI_converter.{}", stem, format.extension())
    }

    /// Render in `format`, or the source's default format.
    pub fn convert(&self, format: Option<OutputFormat>) -> Result<ConvertResult> {
        let format = format.unwrap_or_else(|| self.default_format());
        Ok(ConvertResult {
            content: self.render(format)?,
            filename: self.output_filename(format),
            format,
            mime_type: format.mime_type(),
        })
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter")
            .field("path", &self.path)
            .field("extractor", &self.extractor.name())
            .field("extracted", &self.content.get().is_some())
            .finish()
    }
}

/// Registry for format extractors.
///
/// The registry maps file extensions to extractors and opens converters
/// for source files.
pub struct ConverterRegistry {
    extractors: HashMap<String, Arc<dyn FormatExtractor>>,
    by_name: HashMap<String, Arc<dyn FormatExtractor>>,
    options: ConvertOptions,
}

impl ConverterRegistry {
    /// Create a new empty registry.
    pub fn new(options: ConvertOptions) -> Self {
        Self {
            extractors: HashMap::new(),
            by_name: HashMap::new(),
            options,
        }
    }

    /// Registry with every built-in extractor and default options.
    pub fn with_defaults() -> Self {
        Self::with_options(ConvertOptions::default())
    }

    /// Registry with every built-in extractor.
    pub fn with_options(options: ConvertOptions) -> Self {
        let image = ImageExtractor::from_options(&options);
        let mut registry = Self::new(options);
        registry.register(Arc::new(DocxExtractor::new()));
        registry.register(Arc::new(PdfExtractor::new()));
        registry.register(Arc::new(PptxExtractor::new()));
        registry.register(Arc::new(SpreadsheetExtractor::new()));
        registry.register(Arc::new(image));
        registry
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Register an extractor for all its supported extensions.
    pub fn register(&mut self, extractor: Arc<dyn FormatExtractor>) {
        for ext in extractor.supported_extensions() {
            self.extractors
                .insert(ext.to_lowercase(), extractor.clone());
        }
        self.by_name
            .insert(extractor.name().to_lowercase(), extractor);
    }

    /// Get an extractor by file extension.
    pub fn get_by_extension(&self, ext: &str) -> Option<Arc<dyn FormatExtractor>> {
        self.extractors.get(&ext.to_lowercase()).cloned()
    }

    /// Get an extractor by name.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn FormatExtractor>> {
        self.by_name.get(&name.to_lowercase()).cloned()
    }

    /// Check if an extension is supported.
    pub fn supports(&self, ext: &str) -> bool {
        self.extractors.contains_key(&ext.to_lowercase())
    }

    /// Get all supported extensions, sorted.
    pub fn supported_extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.extractors.keys().map(|s| s.as_str()).collect();
        exts.sort_unstable();
        exts
    }

    /// Open a converter for a file, chosen by its extension.
    pub fn open(&self, path: &Path) -> Result<Converter> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| Error::UnsupportedFormat(format!("{} has no extension", path.display())))?;

        let extractor = self
            .get_by_extension(ext)
            .ok_or_else(|| Error::UnsupportedFormat(ext.to_lowercase()))?;

        Ok(Converter::new(path, extractor, &self.options))
    }

    /// Convert a file in `format`, or the source's default format.
    pub fn convert(&self, path: &Path, format: Option<OutputFormat>) -> Result<ConvertResult> {
        self.open(path)?.convert(format)
    }

    /// Convert many files in parallel, each with its own converter.
    ///
    /// Results keep the input order; one failure does not stop the others.
    pub fn convert_batch<P>(
        &self,
        paths: &[P],
        format: Option<OutputFormat>,
    ) -> Vec<(PathBuf, Result<ConvertResult>)>
    where
        P: AsRef<Path> + Sync,
    {
        paths
            .par_iter()
            .map(|path| {
                let path = path.as_ref();
                let result = self.convert(path, format);
                if let Err(err) = &result {
                    log::warn!("{}", err);
                }
                (path.to_path_buf(), result)
            })
            .collect()
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Extension of the source decides the default output format.
pub(crate) fn default_output_for(path: &Path) -> OutputFormat {
    SourceFormat::from_path(path)
        .map(|f| f.default_output())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_options_builder() {
        let options = ConvertOptions::new()
            .with_vision(VisionConfig::disabled())
            .with_ocr(OcrMode::Disabled)
            .with_json_format(JsonFormat::Compact);

        assert!(!options.vision.enabled);
        assert_eq!(options.ocr, OcrMode::Disabled);
        assert_eq!(options.json_format, JsonFormat::Compact);
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("MD".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("txt".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_registry_with_defaults() {
        let registry = ConverterRegistry::with_defaults();
        for ext in ["docx", "PDF", "pptx", "xlsx", "xls", "csv", "png", "jpeg", "webp"] {
            assert!(registry.supports(ext), "{}", ext);
        }
        assert!(!registry.supports("doc"));
        assert!(registry.get_by_name("spreadsheet").is_some());
    }

    #[test]
    fn test_open_unsupported_extension() {
        let registry = ConverterRegistry::with_defaults();
        let err = registry.open(Path::new("notes.rtf")).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(ext) if ext == "rtf"));
        assert!(registry.open(Path::new("README")).is_err());
    }

    #[test]
    fn test_output_filename_and_default_format() {
        let registry = ConverterRegistry::with_defaults();
        let converter = registry.open(Path::new("/tmp/Quarterly Report.xlsx")).unwrap();
        assert_eq!(converter.filename(), "Quarterly Report.xlsx");
        assert_eq!(converter.file_type(), "excel_spreadsheet");
        assert_eq!(converter.default_format(), OutputFormat::Json);
        assert_eq!(
            converter.output_filename(OutputFormat::Markdown),
            "Quarterly Report_AI_converter.md"
        );
    }

    #[test]
    fn test_missing_file_is_labeled() {
        let registry = ConverterRegistry::with_defaults();
        let converter = registry.open(Path::new("/nonexistent/missing.docx")).unwrap();
        let err = converter.to_markdown().unwrap_err();
        assert!(err.to_string().starts_with("Failed to convert missing.docx"));
    }
}
