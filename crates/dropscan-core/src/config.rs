//! Configuration structures for the dropscan pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the dropscan service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DropscanConfig {
    /// Local storage locations.
    pub storage: StorageConfig,

    /// Folder synchronization configuration.
    pub sync: SyncConfig,

    /// OCR backend configuration.
    pub ocr: OcrSettings,
}

/// Local storage locations for downloaded and intermediate files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Landing directory for downloaded and uploaded files.
    pub downloads_dir: PathBuf,

    /// Region spec file name inside the downloads directory.
    pub regions_file: String,

    /// Intermediate report file name inside the downloads directory.
    pub report_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            downloads_dir: PathBuf::from("downloads"),
            regions_file: "detection_areas.yaml".to_string(),
            report_file: "detected_text.txt".to_string(),
        }
    }
}

impl StorageConfig {
    /// Full path to the region spec file.
    pub fn regions_path(&self) -> PathBuf {
        self.downloads_dir.join(&self.regions_file)
    }

    /// Full path to the intermediate report file.
    pub fn report_path(&self) -> PathBuf {
        self.downloads_dir.join(&self.report_file)
    }
}

/// Folder synchronization configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Seconds between polling ticks.
    pub poll_interval_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 60,
        }
    }
}

/// OCR backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    /// Tesseract language pack string (e.g. "ara+eng").
    pub tesseract_langs: String,

    /// Tesseract page segmentation mode, tuned for small mixed regions.
    pub tesseract_psm: u32,

    /// Directory containing the neural backend's ONNX models.
    pub model_dir: PathBuf,

    /// Text detection model file name (the detector algorithm choice).
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,

    /// Generative model name for the remote backend.
    pub remote_model: String,

    /// Instruction prompt sent with each region crop to the remote backend.
    pub remote_prompt: String,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            tesseract_langs: "ara+eng".to_string(),
            tesseract_psm: 12,
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
            remote_model: "gemini-1.5-flash".to_string(),
            remote_prompt: "Extract text from the image.".to_string(),
        }
    }
}

impl DropscanConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }
}
