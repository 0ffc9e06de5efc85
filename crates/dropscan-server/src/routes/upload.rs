//! Upload endpoints for the region spec and images.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::error::{AppError, Result};
use crate::state::AppState;

const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "tiff", "bmp", "gif"];

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub file_path: String,
}

/// Upload a YAML region spec; stored under the configured spec file name.
pub async fn upload_regions(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let (filename, data) = read_file_field(multipart, "yaml_file").await?;

    if !filename.ends_with(".yaml") && !filename.ends_with(".yml") {
        return Err(AppError::BadRequest(
            "Invalid file type. Only YAML files are allowed.".to_string(),
        ));
    }

    let dest = state.config.storage.regions_path();
    tokio::fs::create_dir_all(&state.config.storage.downloads_dir)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    tokio::fs::write(&dest, &data)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    info!("Region spec uploaded to {}", dest.display());
    Ok(Json(UploadResponse {
        message: "Region spec uploaded successfully.".to_string(),
        file_path: dest.display().to_string(),
    }))
}

/// Upload an image into the downloads directory.
pub async fn upload_image(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let (filename, data) = read_file_field(multipart, "image").await?;

    let extension = filename
        .rsplit('.')
        .next()
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if !IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        return Err(AppError::BadRequest(
            "Invalid file type. Only image files are allowed.".to_string(),
        ));
    }

    let dest = state.config.storage.downloads_dir.join(&filename);
    tokio::fs::create_dir_all(&state.config.storage.downloads_dir)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    tokio::fs::write(&dest, &data)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    info!("Image uploaded to {}", dest.display());
    Ok(Json(UploadResponse {
        message: "Image uploaded successfully.".to_string(),
        file_path: dest.display().to_string(),
    }))
}

/// Pull the named file field out of a multipart body.
///
/// The returned name is the bare file name with any path components
/// stripped, so uploads cannot escape the downloads directory.
async fn read_file_field(
    mut multipart: Multipart,
    field_name: &str,
) -> Result<(String, Vec<u8>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some(field_name) {
            continue;
        }

        let raw_name = field.file_name().unwrap_or_default().to_string();
        let filename = raw_name
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or_default()
            .to_string();
        if filename.is_empty() {
            return Err(AppError::BadRequest("Empty filename".to_string()));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        return Ok((filename, data.to_vec()));
    }

    Err(AppError::BadRequest(format!(
        "No {field_name} file provided"
    )))
}
