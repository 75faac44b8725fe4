//! Text recognition for raster images.

use crate::error::{Error, Result};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use once_cell::sync::OnceCell;
use std::io::{Cursor, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Marker stored in place of OCR text when no engine can run.
pub const OCR_UNAVAILABLE: &str = "[OCR not available - Tesseract not installed]";

/// A text recognition engine.
pub trait OcrBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Whether the engine can run on this machine.
    fn is_available(&self) -> bool {
        true
    }

    /// Recognize the text in an RGB or grayscale bitmap.
    fn recognize(&self, image: &DynamicImage) -> Result<String>;
}

/// Tesseract driven through its command-line binary.
///
/// The image is piped to `tesseract stdin stdout` as PNG.
#[derive(Debug)]
pub struct TesseractCli {
    program: PathBuf,
    available: OnceCell<bool>,
}

impl TesseractCli {
    pub fn new() -> Self {
        Self::with_program("tesseract")
    }

    /// Use a specific `tesseract` executable.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            available: OnceCell::new(),
        }
    }
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self::new()
    }
}

impl OcrBackend for TesseractCli {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn is_available(&self) -> bool {
        *self.available.get_or_init(|| {
            let found = Command::new(&self.program)
                .arg("--version")
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .map(|status| status.success())
                .unwrap_or(false);
            log::debug!("tesseract available: {}", found);
            found
        })
    }

    fn recognize(&self, image: &DynamicImage) -> Result<String> {
        let mut png = Vec::new();
        image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

        let mut child = Command::new(&self.program)
            .args(["stdin", "stdout"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // write from another thread so a full stdout pipe cannot stall us
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::Ocr("tesseract stdin unavailable".to_string()))?;
        let writer = std::thread::spawn(move || stdin.write_all(&png));

        let output = child.wait_with_output()?;
        writer
            .join()
            .map_err(|_| Error::Ocr("stdin writer panicked".to_string()))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Ocr(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// OCR text for an image, or a bracketed marker when recognition is not
/// possible. Never fails.
pub(crate) fn recognize_or_marker(backend: Option<&dyn OcrBackend>, image: &DynamicImage) -> String {
    let Some(backend) = backend.filter(|b| b.is_available()) else {
        return OCR_UNAVAILABLE.to_string();
    };
    match backend.recognize(&flatten_for_ocr(image)) {
        Ok(text) => text.trim().to_string(),
        Err(err) => {
            log::warn!("{} failed: {}", backend.name(), err);
            format!("[OCR Error: {}]", err)
        }
    }
}

/// Composite transparent images onto white; OCR engines read alpha poorly.
pub(crate) fn flatten_for_ocr(image: &DynamicImage) -> DynamicImage {
    if !image.color().has_alpha() {
        return image.clone();
    }
    let rgba = image.to_rgba8();
    let mut out = RgbImage::new(rgba.width(), rgba.height());
    for (x, y, pixel) in rgba.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = a as u32;
        let blend = |c: u8| ((c as u32 * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        out.put_pixel(x, y, Rgb([blend(r), blend(g), blend(b)]));
    }
    DynamicImage::ImageRgb8(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    struct FixedOcr(std::result::Result<String, String>);

    impl OcrBackend for FixedOcr {
        fn name(&self) -> &str {
            "fixed"
        }
        fn recognize(&self, image: &DynamicImage) -> Result<String> {
            assert!(!image.color().has_alpha());
            match &self.0 {
                Ok(text) => Ok(text.clone()),
                Err(msg) => Err(Error::Ocr(msg.clone())),
            }
        }
    }

    struct Missing;

    impl OcrBackend for Missing {
        fn name(&self) -> &str {
            "missing"
        }
        fn is_available(&self) -> bool {
            false
        }
        fn recognize(&self, _image: &DynamicImage) -> Result<String> {
            unreachable!("unavailable backends are never called")
        }
    }

    fn transparent() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 0])))
    }

    #[test]
    fn test_flatten_onto_white() {
        let flat = flatten_for_ocr(&transparent());
        let rgb = flat.as_rgb8().unwrap();
        assert_eq!(rgb.get_pixel(0, 0), &Rgb([255, 255, 255]));

        let opaque = DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, Rgba([10, 20, 30, 255])));
        assert_eq!(
            flatten_for_ocr(&opaque).as_rgb8().unwrap().get_pixel(0, 0),
            &Rgb([10, 20, 30])
        );
    }

    #[test]
    fn test_markers() {
        let image = transparent();
        assert_eq!(recognize_or_marker(None, &image), OCR_UNAVAILABLE);
        assert_eq!(recognize_or_marker(Some(&Missing), &image), OCR_UNAVAILABLE);

        let ok = FixedOcr(Ok("  Invoice 42 \n".to_string()));
        assert_eq!(recognize_or_marker(Some(&ok), &image), "Invoice 42");

        let failing = FixedOcr(Err("bad page".to_string()));
        assert_eq!(
            recognize_or_marker(Some(&failing), &image),
            "[OCR Error: OCR error: bad page]"
        );
    }

    #[test]
    fn test_missing_binary_unavailable() {
        let cli = TesseractCli::with_program("/nonexistent/tesseract-binary");
        assert!(!cli.is_available());
    }
}
