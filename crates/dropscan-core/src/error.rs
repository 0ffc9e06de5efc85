//! Error types for the dropscan-core library.

use thiserror::Error;

/// Main error type for the dropscan library.
#[derive(Error, Debug)]
pub enum DropscanError {
    /// Region specification / configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Folder synchronization error.
    #[error("sync error: {0}")]
    Sync(#[from] SyncError),

    /// Image processing error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to region specification and configuration files.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The region spec file could not be read.
    #[error("failed to read region spec {path}: {reason}")]
    Unreadable { path: String, reason: String },

    /// The region spec file is not valid YAML or has the wrong shape.
    #[error("malformed region spec: {0}")]
    Malformed(String),

    /// A region has zero width or height.
    #[error("region '{name}' has non-positive dimensions ({width}x{height})")]
    EmptyRegion {
        name: String,
        width: u32,
        height: u32,
    },

    /// A configuration value failed validation.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// The input image could not be opened or decoded.
    #[error("failed to read image {path}: {reason}")]
    ImageRead { path: String, reason: String },

    /// Recognition failed for a single region. Recovered by the pipeline
    /// as empty text, never fatal to the run.
    #[error("recognition failed for region '{region}': {reason}")]
    Recognition { region: String, reason: String },

    /// A call to the remote generative backend failed. Recovered per
    /// region as empty text.
    #[error("remote call failed: {0}")]
    RemoteCall(String),

    /// Failed to load OCR models at backend construction.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// An unknown backend discriminator was supplied.
    #[error("unknown OCR backend '{0}', expected one of: local, neural, remote")]
    UnknownBackend(String),

    /// The requested backend requires a credential that was not supplied.
    #[error("backend '{0}' requires an API key")]
    MissingCredential(&'static str),

    /// The requested backend was compiled out of this build.
    #[error("backend '{backend}' is not available - build with the `{feature}` feature")]
    BackendUnavailable {
        backend: &'static str,
        feature: &'static str,
    },

    /// Failed to write the intermediate report file.
    #[error("failed to write report: {0}")]
    ReportWrite(String),
}

/// Errors related to remote folder synchronization.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Listing the watched folder failed. Transient; the loop retries
    /// next tick.
    #[error("failed to list folder {folder_id}: {reason}")]
    List { folder_id: String, reason: String },

    /// Downloading a single file failed. Transient; the file is retried
    /// next tick.
    #[error("failed to download file {file_id}: {reason}")]
    Download { file_id: String, reason: String },

    /// No remote folder matches the requested name.
    #[error("folder '{0}' not found")]
    FolderNotFound(String),

    /// A monitor loop is already running for this service instance.
    #[error("monitoring already in progress")]
    MonitorAlreadyRunning,

    /// The remote storage client rejected the request.
    #[error("remote storage error: {0}")]
    Client(String),
}

/// Result type for the dropscan library.
pub type Result<T> = std::result::Result<T, DropscanError>;
