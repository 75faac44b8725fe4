//! JSON rendering.
//!
//! Most formats share the `{source, content, metadata}` envelope. Spreadsheets
//! replace `content` with a per-sheet records view, and images use their own
//! envelope that carries the full base64 payload and vision analysis.

use crate::error::Result;
use crate::model::{ContentModel, FormatContent, ImageContent, Metadata, Sheet};
use crate::vision::VisionAnalysis;
use serde_json::{json, Map, Value};

use super::SourceInfo;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with two-space indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert a content model to a JSON string.
pub fn to_json(model: &ContentModel, source: &SourceInfo, format: JsonFormat) -> Result<String> {
    let value = to_json_value(model, source)?;
    let text = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(&value)?,
        JsonFormat::Compact => serde_json::to_string(&value)?,
    };
    Ok(text)
}

/// Build the JSON envelope for a content model.
pub fn to_json_value(model: &ContentModel, source: &SourceInfo) -> Result<Value> {
    let source_value = serde_json::to_value(source)?;
    let value = match &model.body {
        FormatContent::Image(image) => image_envelope(image, source_value, &model.metadata),
        FormatContent::Spreadsheet { sheets } => json!({
            "source": source_value,
            "content": { "sheets": sheets.iter().map(sheet_value).collect::<Vec<_>>() },
            "metadata": serde_json::to_value(&model.metadata)?,
        }),
        _ => json!({
            "source": source_value,
            "content": serde_json::to_value(model)?,
            "metadata": serde_json::to_value(&model.metadata)?,
        }),
    };
    Ok(value)
}

fn sheet_value(sheet: &Sheet) -> Value {
    let mut object = Map::new();
    object.insert("name".to_string(), Value::String(sheet.name.clone()));
    match sheet.records() {
        Some(records) => {
            object.insert("headers".to_string(), json!(sheet.headers));
            object.insert(
                "records".to_string(),
                Value::Array(records.into_iter().map(Value::Object).collect()),
            );
            object.insert("raw_rows".to_string(), json!(sheet.rows));
        }
        None => {
            object.insert("raw_rows".to_string(), json!(sheet.rows));
        }
    }
    Value::Object(object)
}

fn image_envelope(image: &ImageContent, source: Value, metadata: &Metadata) -> Value {
    let image_analysis = match &image.vision_analysis {
        VisionAnalysis::Success { analysis, .. } => json!(analysis),
        VisionAnalysis::Failure { error, .. } => json!({ "error": error, "success": false }),
    };

    json!({
        "source": source,
        "metadata": {
            "format": image.format,
            "dimensions": { "width": image.width, "height": image.height },
            "ocr_word_count": metadata.ocr_word_count.unwrap_or(0),
            "base64_size_bytes": image.base64_data.len(),
            "vision_provider": image.vision_analysis.provider(),
            "vision_model": image.vision_analysis.model(),
        },
        "image_analysis": image_analysis,
        "content": {
            "ocr_text": image.ocr_text,
            "base64_data": image.base64_data,
            "base64_mime": image.base64_mime,
            "base64_data_uri": image.data_uri(),
        },
    })
}
