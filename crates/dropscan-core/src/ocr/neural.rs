//! Neural backend backed by `pure-onnx-ocr` detection + recognition models.

use image::{DynamicImage, GrayImage};
use tracing::{debug, info};

use crate::config::OcrSettings;
use crate::error::OcrError;

use super::OcrBackend;

/// Deep-learning backend. Loads ONNX models at construction, which is
/// expensive; construct once and share the instance across requests.
/// The engine caches compiled plans in non-`Sync` cells, so inference
/// is serialized behind a mutex.
pub struct NeuralBackend {
    engine: std::sync::Mutex<pure_onnx_ocr::engine::OcrEngine>,
}

// SAFETY: `OcrEngine` is `!Send`/`!Sync` only because its inference
// sessions cache compiled plans in `RefCell`s behind internal `Arc`s.
// Those `Arc`s never escape the engine's public API, so every clone
// moves with the engine as one unit, and the `RefCell`s are touched
// only inside `run_from_image`, which we call exclusively under the
// mutex above.
unsafe impl Send for NeuralBackend {}
unsafe impl Sync for NeuralBackend {}

impl NeuralBackend {
    /// Load models from the configured model directory.
    ///
    /// The detection model file name is the configurable detector choice;
    /// swapping it swaps the detection algorithm.
    pub fn from_dir(settings: &OcrSettings) -> Result<Self, OcrError> {
        let det_path = settings.model_dir.join(&settings.detection_model);
        let rec_path = settings.model_dir.join(&settings.recognition_model);
        let dict_path = settings.model_dir.join(&settings.dictionary);

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {e}")))?;

        info!(
            "Loaded neural OCR models from {}",
            settings.model_dir.display()
        );

        Ok(Self {
            engine: std::sync::Mutex::new(engine),
        })
    }
}

impl OcrBackend for NeuralBackend {
    fn name(&self) -> &'static str {
        "neural"
    }

    fn extract_region_text(&self, crop: &GrayImage) -> Result<String, OcrError> {
        let image = DynamicImage::ImageLuma8(crop.clone());

        let results = self
            .engine
            .lock()
            .expect("neural engine mutex poisoned")
            .run_from_image(&image)
            .map_err(|e| OcrError::Recognition {
                region: "crop".to_string(),
                reason: format!("pure-onnx-ocr: {e}"),
            })?;

        debug!("neural backend found {} text snippets in crop", results.len());

        let text = results
            .iter()
            .map(|r| r.text.replace("[UNK]", " "))
            .collect::<Vec<_>>()
            .join(" ");

        Ok(text)
    }
}
