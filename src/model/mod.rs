//! Content model shared by every forward extractor and renderer.
//!
//! Extractors populate a [`ContentModel`]; the Markdown and JSON renderers
//! only read it. The common fields (text, paragraphs, headings, tables) are
//! filled by every format, and [`FormatContent`] carries what is specific to
//! one source family.

mod document;
mod image;
mod paragraph;
mod page;
mod sheet;
mod slide;
mod table;

pub use document::{word_count, BlockRef, ContentModel, FormatContent, Metadata};
pub use image::ImageContent;
pub use page::PdfPage;
pub use paragraph::{Heading, Paragraph};
pub use sheet::Sheet;
pub use slide::{Shape, Slide};
pub use table::Table;
