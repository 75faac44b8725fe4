//! Reverse conversion: Markdown back into a Word document.
//!
//! [`MarkdownToDocx`] parses the Markdown dialect written by the forward
//! renderer (plus ordinary hand-written Markdown) into [`Block`] tokens,
//! builds a [`WordDocument`] from them and serializes it as `.docx`.
//! The provenance header of forward output is dropped on the way back.
//!
//! # Example
//!
//! ```no_run
//! use aiready::reverse::{MarkdownToDocx, ReverseConverter};
//! use std::path::Path;
//!
//! fn main() -> aiready::Result<()> {
//!     let result = MarkdownToDocx::new().convert_file(Path::new("notes.md"))?;
//!     std::fs::write(&result.filename, &result.content)?;
//!     Ok(())
//! }
//! ```

mod docx_writer;
mod parser;

pub use docx_writer::{BodyElement, ParagraphItem, Run, WordDocument, WordParagraph, WordTable};
pub use parser::{parse_inline, parse_markdown, Block, Inline};

use crate::error::{Error, Result};
use docx_writer::QUARTER_INCH;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Result of a reverse conversion.
#[derive(Debug, Clone)]
pub struct ReverseResult {
    /// The generated document
    pub content: Vec<u8>,

    /// Suggested output file name, `<stem>_converted.<ext>`
    pub filename: String,

    pub mime_type: &'static str,
}

/// Converts an AI-friendly text format back into a document format.
pub trait ReverseConverter: Send + Sync {
    /// Converter name.
    fn name(&self) -> &str;

    /// Source extensions handled, lower-case, without the dot.
    fn supported_extensions(&self) -> &[&str];

    /// Target type label, e.g. `word_document`.
    fn target_type(&self) -> &str;

    /// Extension of the generated file, without the dot.
    fn target_extension(&self) -> &str;

    fn mime_type(&self) -> &'static str;

    /// Convert source text into the target document's bytes.
    fn convert_source(&self, source: &str) -> Result<Vec<u8>>;

    /// `<stem>_converted.<ext>`
    fn output_filename(&self, path: &Path) -> String {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        format!("{}_converted.{}", stem, self.target_extension())
    }

    /// Read and convert a file. Invalid UTF-8 is replaced, not rejected.
    fn convert_file(&self, path: &Path) -> Result<ReverseResult> {
        let label = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let bytes = std::fs::read(path).map_err(|e| Error::from(e).in_file(&label))?;
        let source = String::from_utf8_lossy(&bytes);
        let content = self
            .convert_source(&source)
            .map_err(|e| e.in_file(&label))?;
        Ok(ReverseResult {
            content,
            filename: self.output_filename(path),
            mime_type: self.mime_type(),
        })
    }
}

/// Markdown to `.docx`.
#[derive(Debug, Clone, Default)]
pub struct MarkdownToDocx {
    _private: (),
}

impl MarkdownToDocx {
    pub fn new() -> Self {
        Self { _private: () }
    }

    /// Tokenize Markdown into blocks.
    pub fn parse(&self, markdown: &str) -> Vec<Block> {
        parse_markdown(markdown)
    }

    /// Build the document tree for a block stream.
    pub fn generate(&self, blocks: &[Block]) -> WordDocument {
        let mut doc = WordDocument::new();
        for block in blocks {
            match block {
                Block::Heading { level, spans } => {
                    let mut p = WordParagraph::styled(format!("Heading{}", level));
                    push_inline(&mut p, spans);
                    doc.push_paragraph(p);
                }
                Block::CodeBlock(lines) => {
                    for line in lines {
                        let mut p = WordParagraph::styled("CodeBlock");
                        if !line.is_empty() {
                            p.push_run(Run::plain(line.as_str()));
                        }
                        doc.push_paragraph(p);
                    }
                }
                Block::Table { header, rows } => {
                    doc.push_table(build_table(header, rows));
                    doc.push_paragraph(WordParagraph::new());
                }
                Block::UnorderedListItem { indent, spans } => {
                    let mut p = WordParagraph::styled("ListBullet").with_indent(list_indent(*indent));
                    push_inline(&mut p, spans);
                    doc.push_paragraph(p);
                }
                Block::OrderedListItem { indent, spans } => {
                    let mut p = WordParagraph::styled("ListNumber").with_indent(list_indent(*indent));
                    push_inline(&mut p, spans);
                    doc.push_paragraph(p);
                }
                Block::Blockquote(lines) => {
                    for line in lines {
                        let mut p = WordParagraph::new().with_indent(2 * QUARTER_INCH);
                        if !line.is_empty() {
                            p.push_run(Run::plain(line.as_str()).italic());
                        }
                        doc.push_paragraph(p);
                    }
                }
                Block::HorizontalRule => doc.push_paragraph(WordParagraph {
                    bottom_border: true,
                    ..WordParagraph::default()
                }),
                Block::Paragraph(spans) => {
                    let mut p = WordParagraph::new();
                    push_inline(&mut p, spans);
                    doc.push_paragraph(p);
                }
            }
        }
        doc
    }

    /// Parse, generate and serialize in one step.
    pub fn to_bytes(&self, markdown: &str) -> Result<Vec<u8>> {
        let blocks = self.parse(markdown);
        log::debug!("markdown: {} blocks", blocks.len());
        self.generate(&blocks).to_bytes()
    }
}

impl ReverseConverter for MarkdownToDocx {
    fn name(&self) -> &str {
        "markdown"
    }

    fn supported_extensions(&self) -> &[&str] {
        &["md", "markdown"]
    }

    fn target_type(&self) -> &str {
        "word_document"
    }

    fn target_extension(&self) -> &str {
        "docx"
    }

    fn mime_type(&self) -> &'static str {
        DOCX_MIME
    }

    fn convert_source(&self, source: &str) -> Result<Vec<u8>> {
        self.to_bytes(source)
    }
}

/// Left indent for a list item at a nesting level.
fn list_indent(level: usize) -> u32 {
    u32::try_from(level)
        .unwrap_or(u32::MAX)
        .saturating_add(1)
        .saturating_mul(QUARTER_INCH)
}

fn push_inline(p: &mut WordParagraph, spans: &[Inline]) {
    for span in spans {
        match span {
            Inline::Plain(text) => p.push_run(Run::plain(text.as_str())),
            Inline::Bold(text) => p.push_run(Run::plain(text.as_str()).bold()),
            Inline::Italic(text) => p.push_run(Run::plain(text.as_str()).italic()),
            Inline::Code(text) => p.push_run(Run::plain(text.as_str()).monospace()),
            Inline::Link { text, url } => p.push_hyperlink(url.as_str(), text.as_str()),
        }
    }
}

/// Header cells are bold; body rows never exceed the header width.
fn build_table(header: &[String], rows: &[Vec<String>]) -> WordTable {
    let columns = header.len();
    let mut table = WordTable {
        columns,
        rows: Vec::with_capacity(rows.len() + 1),
    };
    table
        .rows
        .push(header.iter().map(|c| Run::plain(c.as_str()).bold()).collect());
    for row in rows {
        table
            .rows
            .push(row.iter().take(columns).map(|c| Run::plain(c.as_str())).collect());
    }
    table
}

/// Reverse converters keyed by source extension.
pub struct ReverseRegistry {
    converters: HashMap<String, Arc<dyn ReverseConverter>>,
}

impl ReverseRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            converters: HashMap::new(),
        }
    }

    /// Registry with the built-in Markdown converter.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(MarkdownToDocx::new()));
        registry
    }

    pub fn register(&mut self, converter: Arc<dyn ReverseConverter>) {
        for ext in converter.supported_extensions() {
            self.converters.insert(ext.to_lowercase(), converter.clone());
        }
    }

    pub fn get_by_extension(&self, ext: &str) -> Option<Arc<dyn ReverseConverter>> {
        self.converters.get(&ext.to_lowercase()).cloned()
    }

    pub fn supports(&self, ext: &str) -> bool {
        self.converters.contains_key(&ext.to_lowercase())
    }

    /// Get all supported extensions, sorted.
    pub fn supported_extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.converters.keys().map(|s| s.as_str()).collect();
        exts.sort_unstable();
        exts
    }

    /// Convert a file with the converter registered for its extension.
    pub fn convert(&self, path: &Path) -> Result<ReverseResult> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| Error::UnsupportedFormat(format!("{} has no extension", path.display())))?;
        let converter = self
            .get_by_extension(ext)
            .ok_or_else(|| Error::UnsupportedFormat(ext.to_lowercase()))?;
        converter.convert_file(path)
    }
}

impl Default for ReverseRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for ReverseRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReverseRegistry")
            .field("extensions", &self.supported_extensions())
            .finish()
    }
}
