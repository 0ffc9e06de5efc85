//! Local Tesseract backend via `leptess`.

use image::GrayImage;
use leptess::{LepTess, Variable};
use tracing::warn;

use crate::config::OcrSettings;
use crate::error::OcrError;

use super::OcrBackend;

/// Fast, offline, deterministic backend backed by Tesseract.
///
/// `LepTess` handles are not thread-safe, so one is created per
/// recognition; the initialization cost is small next to recognition
/// itself.
pub struct TesseractBackend {
    langs: String,
    psm: u32,
}

impl TesseractBackend {
    /// Create a backend with the configured language packs and page
    /// segmentation mode.
    pub fn new(settings: &OcrSettings) -> Self {
        Self {
            langs: settings.tesseract_langs.clone(),
            psm: settings.tesseract_psm,
        }
    }

    fn recognize(&self, crop: &GrayImage) -> Result<String, OcrError> {
        let mut tess = LepTess::new(None, &self.langs)
            .map_err(|e| OcrError::ModelLoad(format!("tesseract init: {e}")))?;

        tess.set_variable(Variable::TesseditPagesegMode, &self.psm.to_string())
            .map_err(|e| OcrError::ModelLoad(format!("tesseract psm: {e}")))?;

        // leptess takes image data in an encoded format, not raw pixels.
        let mut png = Vec::new();
        crop.write_to(
            &mut std::io::Cursor::new(&mut png),
            image::ImageFormat::Png,
        )
        .map_err(|e| OcrError::ModelLoad(format!("png encode: {e}")))?;

        tess.set_image_from_mem(&png)
            .map_err(|e| OcrError::ModelLoad(format!("tesseract set image: {e}")))?;
        tess.set_source_resolution(300);

        Ok(tess.get_utf8_text().unwrap_or_else(|e| {
            // Tesseract failing on one crop yields empty text, never an
            // aborted run.
            warn!("tesseract recognition failed: {}", e);
            String::new()
        }))
    }
}

impl OcrBackend for TesseractBackend {
    fn name(&self) -> &'static str {
        "local"
    }

    fn extract_region_text(&self, crop: &GrayImage) -> Result<String, OcrError> {
        self.recognize(crop)
    }
}
