//! Raster image extraction: OCR text, a base64 payload and vision analysis.

use super::ocr::{self, OcrBackend, TesseractCli};
use super::FormatExtractor;
use crate::convert::{ConvertOptions, OcrMode};
use crate::error::Result;
use crate::model::{word_count, ContentModel, FormatContent, ImageContent, Metadata};
use crate::vision::{self, VisionConfig};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{DynamicImage, ImageFormat};
use std::fmt;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "tiff", "tif", "webp"];

/// Extractor for raster images.
#[derive(Clone)]
pub struct ImageExtractor {
    ocr: Option<Arc<dyn OcrBackend>>,
    vision: VisionConfig,
}

impl ImageExtractor {
    /// Create an extractor with an explicit OCR engine and vision settings.
    pub fn new(ocr: Option<Arc<dyn OcrBackend>>, vision: VisionConfig) -> Self {
        Self { ocr, vision }
    }

    /// Tesseract when OCR is enabled, plus the options' vision settings.
    pub fn from_options(options: &ConvertOptions) -> Self {
        let ocr: Option<Arc<dyn OcrBackend>> = match options.ocr {
            OcrMode::Auto => Some(Arc::new(TesseractCli::new())),
            OcrMode::Disabled => None,
        };
        Self::new(ocr, options.vision.clone())
    }

    /// Build the content model from the image's bytes.
    pub fn extract_bytes(&self, bytes: &[u8], path: &Path) -> Result<ContentModel> {
        let format = match image::guess_format(bytes) {
            Ok(format) => format,
            Err(_) => ImageFormat::from_path(path)?,
        };
        let img = image::load_from_memory_with_format(bytes, format)?;
        let label = format_label(format, path);

        let ocr_text = ocr::recognize_or_marker(self.ocr.as_deref(), &img);
        let (payload, saved_as) = encode_payload(&img, format)?;
        let base64_data = STANDARD.encode(payload);
        let analysis = vision::analyze_image(&self.vision, bytes, format.to_mime_type());

        let content = ImageContent {
            format: label.clone(),
            width: img.width(),
            height: img.height(),
            base64_mime: format!("image/{}", format_label(saved_as, path).to_lowercase()),
            base64_data,
            ocr_text,
            vision_analysis: analysis,
        };

        let recognized = if content.has_ocr_text() {
            content.ocr_text.clone()
        } else {
            String::new()
        };
        let mut model = ContentModel::new(FormatContent::Image(content.clone()));
        model.text = recognized;
        model.metadata = Metadata {
            format: Some(label),
            width: Some(content.width),
            height: Some(content.height),
            ocr_word_count: Some(word_count(&model.text)),
            base64_size_bytes: Some(content.base64_data.len()),
            vision_analysis_success: Some(content.vision_analysis.is_success()),
            vision_provider: content.vision_analysis.provider().map(str::to_string),
            vision_model: content.vision_analysis.model().map(str::to_string),
            ..Metadata::default()
        };
        Ok(model)
    }
}

impl fmt::Debug for ImageExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageExtractor")
            .field("ocr", &self.ocr.as_ref().map(|o| o.name().to_string()))
            .field("vision", &self.vision)
            .finish()
    }
}

impl FormatExtractor for ImageExtractor {
    fn name(&self) -> &str {
        "image"
    }

    fn supported_extensions(&self) -> &[&str] {
        IMAGE_EXTENSIONS
    }

    fn extract(&self, path: &Path) -> Result<ContentModel> {
        let bytes = std::fs::read(path)?;
        let model = self.extract_bytes(&bytes, path)?;
        log::debug!(
            "image: {}x{}",
            model.metadata.width.unwrap_or(0),
            model.metadata.height.unwrap_or(0)
        );
        Ok(model)
    }
}

/// Upper-case format name as image tools print it (`PNG`, `JPEG`).
fn format_label(format: ImageFormat, path: &Path) -> String {
    match format {
        ImageFormat::Png => "PNG".to_string(),
        ImageFormat::Jpeg => "JPEG".to_string(),
        ImageFormat::Gif => "GIF".to_string(),
        ImageFormat::Bmp => "BMP".to_string(),
        ImageFormat::Tiff => "TIFF".to_string(),
        ImageFormat::WebP => "WEBP".to_string(),
        other => other
            .extensions_str()
            .first()
            .map(|ext| ext.to_uppercase())
            .or_else(|| {
                path.extension()
                    .and_then(|e| e.to_str())
                    .map(str::to_uppercase)
            })
            .unwrap_or_else(|| "UNKNOWN".to_string()),
    }
}

/// Re-encode in the source format, PNG when that fails. JPEG has no
/// alpha channel so it is encoded from RGB.
fn encode_payload(img: &DynamicImage, format: ImageFormat) -> Result<(Vec<u8>, ImageFormat)> {
    let mut buffer = Vec::new();
    let attempt = if format == ImageFormat::Jpeg {
        DynamicImage::ImageRgb8(img.to_rgb8()).write_to(&mut Cursor::new(&mut buffer), format)
    } else {
        img.write_to(&mut Cursor::new(&mut buffer), format)
    };

    match attempt {
        Ok(()) => Ok((buffer, format)),
        Err(err) => {
            log::debug!("Re-encoding as {:?} failed ({}), using PNG", format, err);
            let mut png = Vec::new();
            img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
            Ok((png, ImageFormat::Png))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::OCR_UNAVAILABLE;
    use image::{Rgba, RgbaImage};

    fn png_bytes() -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 3, Rgba([200, 10, 10, 128])));
        let mut out = Vec::new();
        img.write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn test_extract_png_without_ocr_or_vision() {
        let extractor = ImageExtractor::new(None, VisionConfig::disabled());
        let model = extractor
            .extract_bytes(&png_bytes(), Path::new("dot.png"))
            .unwrap();
        let image = model.image().unwrap();

        assert_eq!(image.format, "PNG");
        assert_eq!((image.width, image.height), (4, 3));
        assert_eq!(image.ocr_text, OCR_UNAVAILABLE);
        assert_eq!(image.base64_mime, "image/png");
        assert!(image.data_uri().starts_with("data:image/png;base64,"));
        assert!(!image.vision_analysis.is_success());

        assert_eq!(model.text, "");
        assert_eq!(model.metadata.ocr_word_count, Some(0));
        assert_eq!(model.metadata.base64_size_bytes, Some(image.base64_data.len()));
        assert_eq!(model.metadata.vision_analysis_success, Some(false));
    }

    #[test]
    fn test_jpeg_payload_drops_alpha() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 100])));
        let (bytes, format) = encode_payload(&img, ImageFormat::Jpeg).unwrap();
        assert_eq!(format, ImageFormat::Jpeg);
        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn test_garbage_is_an_error() {
        let extractor = ImageExtractor::new(None, VisionConfig::disabled());
        assert!(extractor
            .extract_bytes(b"not an image", Path::new("x.png"))
            .is_err());
    }

    #[test]
    fn test_format_labels() {
        assert_eq!(format_label(ImageFormat::Jpeg, Path::new("a.jpg")), "JPEG");
        assert_eq!(format_label(ImageFormat::WebP, Path::new("a.webp")), "WEBP");
    }
}
