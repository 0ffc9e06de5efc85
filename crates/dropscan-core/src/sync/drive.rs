//! Google Drive implementation of [`RemoteFolder`].
//!
//! Talks to the Drive v3 REST API with a caller-supplied bearer token.
//! Acquiring and refreshing that token is outside this client; it only
//! lists, downloads, and resolves folder names.

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::SyncError;

use super::{RemoteFile, RemoteFolder};

const DRIVE_API: &str = "https://www.googleapis.com/drive/v3";

/// Drive v3 client bound to one access token.
pub struct DriveClient {
    client: reqwest::Client,
    access_token: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<RemoteFile>,
}

#[derive(Debug, Deserialize)]
struct IdOnlyList {
    #[serde(default)]
    files: Vec<IdOnly>,
}

#[derive(Debug, Deserialize)]
struct IdOnly {
    id: String,
}

impl DriveClient {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            access_token: access_token.into(),
            base_url: DRIVE_API.to_string(),
        }
    }

    /// Override the API base URL. Used by tests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn files_query<T: serde::de::DeserializeOwned>(
        &self,
        query: &str,
        fields: &str,
    ) -> Result<T, SyncError> {
        let response = self
            .client
            .get(format!("{}/files", self.base_url))
            .bearer_auth(&self.access_token)
            .query(&[("q", query), ("spaces", "drive"), ("fields", fields)])
            .send()
            .await
            .map_err(|e| SyncError::Client(e.to_string()))?
            .error_for_status()
            .map_err(|e| SyncError::Client(e.to_string()))?;

        response
            .json()
            .await
            .map_err(|e| SyncError::Client(format!("invalid listing: {e}")))
    }
}

#[async_trait]
impl RemoteFolder for DriveClient {
    async fn list_files(&self, folder_id: &str) -> Result<Vec<RemoteFile>, SyncError> {
        let query = format!("'{folder_id}' in parents and trashed=false");
        let listing: FileList = self
            .files_query(&query, "files(id, name, mimeType, createdTime)")
            .await
            .map_err(|e| SyncError::List {
                folder_id: folder_id.to_string(),
                reason: e.to_string(),
            })?;

        debug!("Folder {} lists {} files", folder_id, listing.files.len());
        Ok(listing.files)
    }

    async fn download_file(&self, file_id: &str, dest: &Path) -> Result<u64, SyncError> {
        let download_err = |reason: String| SyncError::Download {
            file_id: file_id.to_string(),
            reason,
        };

        let response = self
            .client
            .get(format!("{}/files/{}", self.base_url, file_id))
            .bearer_auth(&self.access_token)
            .query(&[("alt", "media")])
            .send()
            .await
            .map_err(|e| download_err(e.to_string()))?
            .error_for_status()
            .map_err(|e| download_err(e.to_string()))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| download_err(e.to_string()))?;

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| download_err(e.to_string()))?;
        }
        tokio::fs::write(dest, &bytes)
            .await
            .map_err(|e| download_err(e.to_string()))?;

        Ok(bytes.len() as u64)
    }

    async fn folder_id_by_name(&self, name: &str) -> Result<String, SyncError> {
        let query = format!(
            "name='{name}' and mimeType='application/vnd.google-apps.folder' and trashed=false"
        );
        let listing: IdOnlyList = self.files_query(&query, "files(id)").await?;

        listing
            .files
            .into_iter()
            .next()
            .map(|f| f.id)
            .ok_or_else(|| SyncError::FolderNotFound(name.to_string()))
    }
}
