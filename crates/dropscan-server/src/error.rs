//! HTTP error mapping for the dropscan server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use dropscan_core::{ConfigError, DropscanError, OcrError, SyncError};

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),
}

/// Error response body.
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(ErrorResponse {
            error: self.to_string(),
        });

        (status, body).into_response()
    }
}

impl From<DropscanError> for AppError {
    fn from(err: DropscanError) -> Self {
        match err {
            DropscanError::Config(e) => e.into(),
            DropscanError::Ocr(e) => e.into(),
            DropscanError::Sync(e) => e.into(),
            DropscanError::Image(e) => AppError::BadRequest(e.to_string()),
            DropscanError::Io(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        // A bad or missing region spec invalidates the request.
        AppError::BadRequest(err.to_string())
    }
}

impl From<OcrError> for AppError {
    fn from(err: OcrError) -> Self {
        match err {
            OcrError::UnknownBackend(_)
            | OcrError::MissingCredential(_)
            | OcrError::BackendUnavailable { .. }
            | OcrError::ImageRead { .. } => AppError::BadRequest(err.to_string()),
            _ => AppError::Internal(err.to_string()),
        }
    }
}

impl From<SyncError> for AppError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::FolderNotFound(_) => AppError::NotFound(err.to_string()),
            SyncError::MonitorAlreadyRunning => AppError::Conflict(err.to_string()),
            _ => AppError::Internal(err.to_string()),
        }
    }
}
