//! Remote folder synchronization.
//!
//! A [`FolderMonitor`] polls a remote folder through the [`RemoteFolder`]
//! trait, downloading each file exactly once per monitoring session. The
//! seen-file set is process-local: restarting the service forgets it and
//! may re-download already-processed files. That is the defined behavior;
//! there is no cross-restart checkpoint.

mod drive;
mod monitor;

pub use drive::DriveClient;
pub use monitor::FolderMonitor;

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SyncError;

/// Metadata for one file in the watched remote folder.
///
/// Identity is `id`; names may collide across files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFile {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub created_time: DateTime<Utc>,
}

/// Remote folder listing collaborator.
///
/// Authentication and token handling live behind implementations of this
/// trait; the synchronizer only lists, downloads, and resolves names.
#[async_trait]
pub trait RemoteFolder: Send + Sync {
    /// List the files currently present under a folder.
    async fn list_files(&self, folder_id: &str) -> Result<Vec<RemoteFile>, SyncError>;

    /// Download a file to `dest`, returning the number of bytes written.
    async fn download_file(&self, file_id: &str, dest: &Path) -> Result<u64, SyncError>;

    /// Resolve a folder name to its id.
    async fn folder_id_by_name(&self, name: &str) -> Result<String, SyncError>;
}
