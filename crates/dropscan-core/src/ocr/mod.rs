//! Region-based OCR pipeline with interchangeable recognition backends.
//!
//! Every backend shares the same pipeline shape: load the image, crop
//! each named region, run the shared preprocessing, and feed the crop to
//! the backend-specific recognizer. A failed recognition for one region
//! is recovered as empty text and never aborts the run.

pub mod preprocess;
mod remote;

#[cfg(feature = "tesseract")]
mod local;
#[cfg(feature = "native")]
mod neural;

#[cfg(feature = "tesseract")]
pub use local::TesseractBackend;
#[cfg(feature = "native")]
pub use neural::NeuralBackend;
pub use remote::GenerativeBackend;

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use image::GrayImage;
use tracing::{debug, info, warn};

use crate::config::OcrSettings;
use crate::error::OcrError;
use crate::regions::{load_regions, RegionSet};

/// Delimiter between region blocks in the intermediate report.
pub const REPORT_DELIMITER: &str =
    "--------------------------------------------------";

/// One interchangeable text-recognition backend.
///
/// Region loading and crop preprocessing are provided methods so they
/// cannot diverge between backends; only the recognizer itself is
/// backend-specific.
pub trait OcrBackend: Send + Sync {
    /// Backend identifier for logs.
    fn name(&self) -> &'static str;

    /// Recognize text in one preprocessed region crop.
    fn extract_region_text(&self, crop: &GrayImage) -> Result<String, OcrError>;

    /// Load the region spec this backend will be run against.
    fn load_regions(&self, path: &Path) -> Result<RegionSet, crate::error::ConfigError> {
        load_regions(path)
    }

    /// Run the shared preprocessing on a raw crop.
    fn preprocess(&self, crop: &image::DynamicImage) -> GrayImage {
        preprocess::prepare_crop(crop)
    }
}

/// Backend discriminator, parsed from the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Tesseract, fast and offline.
    Local,
    /// Deep-learning models loaded at construction.
    Neural,
    /// Remote generative model, prompt-driven.
    Remote,
}

impl FromStr for BackendKind {
    type Err = OcrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "neural" => Ok(Self::Neural),
            "remote" => Ok(Self::Remote),
            other => Err(OcrError::UnknownBackend(other.to_string())),
        }
    }
}

/// Construct a backend from its discriminator.
///
/// The remote backend requires `api_key`; its absence fails here, before
/// any image I/O. Backends compiled out of this build fail with
/// [`OcrError::BackendUnavailable`].
pub fn create_backend(
    kind: BackendKind,
    settings: &OcrSettings,
    api_key: Option<&str>,
) -> Result<Arc<dyn OcrBackend>, OcrError> {
    match kind {
        BackendKind::Local => {
            #[cfg(feature = "tesseract")]
            {
                Ok(Arc::new(TesseractBackend::new(settings)))
            }
            #[cfg(not(feature = "tesseract"))]
            {
                Err(OcrError::BackendUnavailable {
                    backend: "local",
                    feature: "tesseract",
                })
            }
        }
        BackendKind::Neural => {
            #[cfg(feature = "native")]
            {
                Ok(Arc::new(NeuralBackend::from_dir(settings)?))
            }
            #[cfg(not(feature = "native"))]
            {
                Err(OcrError::BackendUnavailable {
                    backend: "neural",
                    feature: "native",
                })
            }
        }
        BackendKind::Remote => {
            let key = api_key
                .filter(|k| !k.trim().is_empty())
                .ok_or(OcrError::MissingCredential("remote"))?;
            Ok(Arc::new(GenerativeBackend::new(key, settings)))
        }
    }
}

/// Text recognized in one region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionText {
    /// Region name from the detection-areas file.
    pub name: String,
    /// Whitespace-trimmed recognized text; empty on recognition failure.
    pub text: String,
}

/// Ordered per-region output of one pipeline run.
///
/// One entry per region, in spec declaration order. Never mutated after
/// the run completes.
#[derive(Debug, Clone, Default)]
pub struct ExtractionResult {
    entries: Vec<RegionText>,
}

impl ExtractionResult {
    /// Number of regions processed.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the run produced any entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in region declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &RegionText> {
        self.entries.iter()
    }

    /// Render the intermediate report: one block per region, each block a
    /// `Text in <name>: <text>` header followed by the 50-dash delimiter.
    pub fn to_report(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(&format!("Text in {}: {}\n", entry.name, entry.text));
            out.push_str(REPORT_DELIMITER);
            out.push('\n');
        }
        out
    }

    /// Write the intermediate report file.
    pub fn write_report(&self, path: &Path) -> Result<(), OcrError> {
        std::fs::write(path, self.to_report())
            .map_err(|e| OcrError::ReportWrite(format!("{}: {e}", path.display())))
    }
}

/// Run the region pipeline for one image.
///
/// Fails only if the image itself cannot be decoded; individual region
/// failures are logged and recovered as empty text, so the result always
/// has exactly one entry per region, in declaration order. The report
/// file at `report_path` is working state for the field extractor, not a
/// durable record.
pub fn run_pipeline(
    backend: &dyn OcrBackend,
    image_path: &Path,
    regions: &RegionSet,
    report_path: &Path,
) -> Result<ExtractionResult, OcrError> {
    let image = image::open(image_path).map_err(|e| OcrError::ImageRead {
        path: image_path.display().to_string(),
        reason: e.to_string(),
    })?;

    info!(
        "Running {} OCR over {} regions of {}",
        backend.name(),
        regions.len(),
        image_path.display()
    );

    let mut entries = Vec::with_capacity(regions.len());

    for region in regions {
        let text = match preprocess::crop_region(&image, region) {
            Some(crop) => {
                let prepared = backend.preprocess(&crop);
                match backend.extract_region_text(&prepared) {
                    Ok(text) => text.trim().to_string(),
                    Err(e) => {
                        warn!("Recognition failed for region '{}': {}", region.name, e);
                        String::new()
                    }
                }
            }
            None => String::new(),
        };

        debug!("Region '{}': {:?}", region.name, text);
        entries.push(RegionText {
            name: region.name.clone(),
            text,
        });
    }

    let result = ExtractionResult { entries };
    result.write_report(report_path)?;
    info!("Detected text saved to: {}", report_path.display());

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regions::parse_regions;
    use image::{ImageBuffer, Luma};
    use pretty_assertions::assert_eq;

    /// Backend that returns scripted strings, one per call.
    struct ScriptedBackend {
        texts: std::sync::Mutex<Vec<&'static str>>,
    }

    impl ScriptedBackend {
        fn new(texts: Vec<&'static str>) -> Self {
            Self {
                texts: std::sync::Mutex::new(texts),
            }
        }
    }

    impl OcrBackend for ScriptedBackend {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn extract_region_text(&self, _crop: &GrayImage) -> Result<String, OcrError> {
            let mut texts = self.texts.lock().unwrap();
            if texts.is_empty() {
                return Err(OcrError::Recognition {
                    region: "?".to_string(),
                    reason: "script exhausted".to_string(),
                });
            }
            Ok(texts.remove(0).to_string())
        }
    }

    fn test_image(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("invoice.png");
        let img: ImageBuffer<Luma<u8>, Vec<u8>> = ImageBuffer::from_pixel(200, 200, Luma([255]));
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn test_pipeline_preserves_region_order_and_length() {
        let dir = tempfile::tempdir().unwrap();
        let image_path = test_image(dir.path());
        let report_path = dir.path().join("detected_text.txt");

        let regions =
            parse_regions("area_1: [0, 0, 50, 20]\narea_2: [0, 30, 50, 20]\n").unwrap();
        let backend = ScriptedBackend::new(vec!["INV-100", " 2024-03-01 "]);

        let result = run_pipeline(&backend, &image_path, &regions, &report_path).unwrap();

        assert_eq!(result.len(), regions.len());
        let pairs: Vec<(&str, &str)> = result
            .iter()
            .map(|e| (e.name.as_str(), e.text.as_str()))
            .collect();
        // Output is trimmed and in declaration order.
        assert_eq!(pairs, vec![("area_1", "INV-100"), ("area_2", "2024-03-01")]);
    }

    #[test]
    fn test_pipeline_recovers_failed_region_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let image_path = test_image(dir.path());
        let report_path = dir.path().join("detected_text.txt");

        let regions =
            parse_regions("area_1: [0, 0, 50, 20]\narea_2: [0, 30, 50, 20]\n").unwrap();
        // Script has one entry; the second region's recognition errors.
        let backend = ScriptedBackend::new(vec!["INV-7"]);

        let result = run_pipeline(&backend, &image_path, &regions, &report_path).unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result.iter().nth(1).unwrap().text, "");
    }

    #[test]
    fn test_pipeline_unreadable_image_fails() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("missing.png");
        let report_path = dir.path().join("detected_text.txt");
        let regions = parse_regions("area_1: [0, 0, 10, 10]\n").unwrap();
        let backend = ScriptedBackend::new(vec![]);

        let err = run_pipeline(&backend, &bogus, &regions, &report_path).unwrap_err();
        assert!(matches!(err, OcrError::ImageRead { .. }));
    }

    #[test]
    fn test_report_format() {
        let result = ExtractionResult {
            entries: vec![
                RegionText {
                    name: "area_1".to_string(),
                    text: "INV-100".to_string(),
                },
                RegionText {
                    name: "area_2".to_string(),
                    text: String::new(),
                },
            ],
        };

        let report = result.to_report();
        let expected = format!(
            "Text in area_1: INV-100\n{d}\nText in area_2: \n{d}\n",
            d = REPORT_DELIMITER
        );
        assert_eq!(report, expected);
        assert_eq!(REPORT_DELIMITER.len(), 50);
    }

    #[test]
    fn test_backend_kind_parsing() {
        assert_eq!("local".parse::<BackendKind>().unwrap(), BackendKind::Local);
        assert_eq!("NEURAL".parse::<BackendKind>().unwrap(), BackendKind::Neural);
        assert_eq!("remote".parse::<BackendKind>().unwrap(), BackendKind::Remote);
        assert!(matches!(
            "easyocr".parse::<BackendKind>(),
            Err(OcrError::UnknownBackend(_))
        ));
    }

    #[test]
    fn test_remote_backend_requires_credential() {
        let settings = crate::config::OcrSettings::default();
        assert!(matches!(
            create_backend(BackendKind::Remote, &settings, None),
            Err(OcrError::MissingCredential("remote"))
        ));
        assert!(matches!(
            create_backend(BackendKind::Remote, &settings, Some("  ")),
            Err(OcrError::MissingCredential("remote"))
        ));
    }
}
