//! Invoice extraction endpoint.

use axum::{extract::State, Json};
use serde::Deserialize;
use tracing::info;

use dropscan_core::extract::{parse_report_file, FieldRecord};
use dropscan_core::ocr::{run_pipeline, BackendKind};

use crate::error::{AppError, Result};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    /// Name of an image file already present in the downloads directory.
    pub filename: String,
    /// Backend discriminator: local, neural, or remote.
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Credential for the remote backend only.
    pub api_key: Option<String>,
}

fn default_backend() -> String {
    "local".to_string()
}

/// Extract invoice fields from an image in the downloads directory.
///
/// Validation (file exists, backend known, remote key present) happens
/// before any OCR work. Recognition runs on the blocking pool; it can
/// take long, especially for the remote backend, and the request waits
/// for it.
pub async fn extract_invoice(
    State(state): State<AppState>,
    Json(req): Json<ExtractRequest>,
) -> Result<Json<FieldRecord>> {
    // Path components are rejected: the request names a file already
    // inside the downloads directory, never one outside it.
    let filename = req
        .filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim()
        .to_string();
    if filename.is_empty() {
        return Err(AppError::BadRequest("No filename provided".to_string()));
    }
    if filename != req.filename {
        return Err(AppError::BadRequest(format!(
            "Invalid filename '{}'",
            req.filename
        )));
    }

    let image_path = state.config.storage.downloads_dir.join(&filename);
    if !image_path.is_file() {
        return Err(AppError::BadRequest(format!(
            "File '{}' does not exist in downloads folder",
            filename
        )));
    }

    let kind: BackendKind = req.backend.parse().map_err(AppError::from)?;
    if kind == BackendKind::Remote && req.api_key.as_deref().unwrap_or("").trim().is_empty() {
        return Err(AppError::BadRequest(
            "api_key is required for the remote backend".to_string(),
        ));
    }

    let regions_path = state.config.storage.regions_path();
    let api_key = req.api_key.clone();
    let task_state = state.clone();

    // Backend construction and recognition both belong on the blocking
    // pool: the remote backend carries a blocking HTTP client.
    let record = tokio::task::spawn_blocking(move || -> Result<FieldRecord> {
        let backend = task_state.backend(kind, api_key.as_deref())?;
        let regions = backend.load_regions(&regions_path)?;

        // Each request writes its own report file so concurrent
        // extractions cannot read each other's output. Dropping the
        // handle deletes the file.
        let report = tempfile::Builder::new()
            .prefix("detected_text-")
            .suffix(".txt")
            .tempfile_in(&task_state.config.storage.downloads_dir)
            .map_err(|e| AppError::Internal(format!("could not create report file: {e}")))?;

        run_pipeline(backend.as_ref(), &image_path, &regions, report.path())?;
        Ok(parse_report_file(report.path()))
    })
    .await
    .map_err(|e| AppError::Internal(format!("extraction task failed: {e}")))??;

    info!("Extracted invoice fields from {}", filename);
    Ok(Json(record))
}
