//! Renderers that project a [`ContentModel`](crate::model::ContentModel) into
//! Markdown or JSON.

mod json;
mod markdown;

pub use json::{to_json, to_json_value, JsonFormat};
pub use markdown::{pipe_table, provenance_header, to_markdown, MarkdownRenderer};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Where a rendering came from; written into the Markdown header and the
/// JSON `source` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceInfo {
    /// File name of the source document, without directories
    pub filename: String,

    /// Source type label, e.g. `word_document`
    #[serde(rename = "type")]
    pub file_type: String,

    pub converted_at: DateTime<Utc>,
}

impl SourceInfo {
    /// Describe a conversion happening now.
    pub fn new(filename: impl Into<String>, file_type: impl Into<String>) -> Self {
        Self::at(filename, file_type, Utc::now())
    }

    /// Describe a conversion with a fixed timestamp.
    pub fn at(
        filename: impl Into<String>,
        file_type: impl Into<String>,
        converted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            filename: filename.into(),
            file_type: file_type.into(),
            converted_at,
        }
    }
}
