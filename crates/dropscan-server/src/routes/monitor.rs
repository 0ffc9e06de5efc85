//! Folder monitoring endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use dropscan_core::sync::RemoteFolder;

use crate::error::Result;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MonitorRequest {
    pub folder_name: String,
}

#[derive(Debug, Serialize)]
pub struct MonitorResponse {
    pub message: String,
    pub folder_id: String,
}

/// Start monitoring a remote folder for new files.
///
/// Only one monitor loop may be active per service instance; a second
/// request is rejected with 409 while the first keeps running.
pub async fn start_monitor(
    State(state): State<AppState>,
    Json(req): Json<MonitorRequest>,
) -> Result<Json<MonitorResponse>> {
    let folder_id = state.drive.folder_id_by_name(&req.folder_name).await?;

    let client: Arc<dyn RemoteFolder> = state.drive.clone();
    state.monitor.start(
        client,
        folder_id.clone(),
        state.config.storage.downloads_dir.clone(),
        Duration::from_secs(state.config.sync.poll_interval_secs),
    )?;

    info!("Monitoring started for folder '{}'", req.folder_name);
    Ok(Json(MonitorResponse {
        message: "Monitoring started".to_string(),
        folder_id,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use dropscan_core::sync::DriveClient;
    use dropscan_core::DropscanConfig;

    #[tokio::test]
    async fn unresolvable_folder_leaves_monitor_idle() {
        // Nothing answers on this port; name resolution fails before any
        // loop could start.
        let drive = DriveClient::new("test-token").with_base_url("http://127.0.0.1:1/drive/v3");
        let state = crate::state::AppState::new(DropscanConfig::default(), drive);

        let result = start_monitor(
            State(state.clone()),
            Json(MonitorRequest {
                folder_name: "Invoices".to_string(),
            }),
        )
        .await;

        assert!(matches!(result, Err(AppError::Internal(_))));
        assert!(!state.monitor.is_active());
    }
}
