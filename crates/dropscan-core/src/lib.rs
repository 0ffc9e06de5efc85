//! Core library for invoice capture from a watched remote folder.
//!
//! This crate provides:
//! - Region spec loading (named rectangles from a YAML file)
//! - A region-based OCR pipeline over interchangeable backends
//!   (local Tesseract, neural ONNX models, remote generative model)
//! - Invoice field extraction from the per-region text report
//! - Folder synchronization: poll a remote folder, download each new
//!   file exactly once per session

pub mod config;
pub mod error;
pub mod extract;
pub mod ocr;
pub mod regions;
pub mod sync;

pub use config::{DropscanConfig, OcrSettings, StorageConfig, SyncConfig};
pub use error::{ConfigError, DropscanError, OcrError, Result, SyncError};
pub use extract::{parse_report, parse_report_file, FieldRecord};
pub use ocr::{create_backend, run_pipeline, BackendKind, ExtractionResult, OcrBackend};
pub use regions::{load_regions, Region, RegionSet};
pub use sync::{DriveClient, FolderMonitor, RemoteFile, RemoteFolder};
