//! Raster image content.

use crate::vision::VisionAnalysis;
use serde::Serialize;

/// What the image extractor learned about one image.
#[derive(Debug, Clone, Serialize)]
pub struct ImageContent {
    /// Format name, e.g. `PNG` or `JPEG`
    pub format: String,
    pub width: u32,
    pub height: u32,

    /// Recognized text, or a bracketed marker when OCR did not run
    pub ocr_text: String,

    /// Base64 of the re-encoded image
    pub base64_data: String,
    pub base64_mime: String,

    pub vision_analysis: VisionAnalysis,
}

impl ImageContent {
    /// `data:` URI of the encoded payload.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.base64_mime, self.base64_data)
    }

    /// Whether OCR produced real text rather than a marker.
    pub fn has_ocr_text(&self) -> bool {
        !self.ocr_text.is_empty() && !self.ocr_text.starts_with('[')
    }
}
