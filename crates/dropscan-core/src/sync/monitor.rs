//! Polling loop with an in-memory seen-file set.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::error::SyncError;

use super::RemoteFolder;

/// Owns the single polling loop of a service instance.
///
/// `start` is an atomic check-and-start: a second start while the loop
/// is alive is rejected with [`SyncError::MonitorAlreadyRunning`], never
/// queued. The loop itself has no natural termination; it runs until
/// [`FolderMonitor::stop`] or process teardown.
pub struct FolderMonitor {
    active: Arc<AtomicBool>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Default for FolderMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl FolderMonitor {
    pub fn new() -> Self {
        Self {
            active: Arc::new(AtomicBool::new(false)),
            handle: Mutex::new(None),
        }
    }

    /// Whether a polling loop is currently running.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Start polling `folder_id` every `interval`, downloading unseen
    /// files into `downloads_dir`.
    pub fn start(
        &self,
        client: Arc<dyn RemoteFolder>,
        folder_id: String,
        downloads_dir: PathBuf,
        interval: Duration,
    ) -> Result<(), SyncError> {
        // The flag flip and the spawn must not race with a concurrent
        // start; compare_exchange makes the check-and-start atomic.
        self.active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| SyncError::MonitorAlreadyRunning)?;

        let task = tokio::spawn(async move {
            info!("Monitoring folder {} every {:?}", folder_id, interval);
            let mut seen: HashSet<String> = HashSet::new();

            loop {
                poll_tick(&*client, &folder_id, &downloads_dir, &mut seen).await;
                tokio::time::sleep(interval).await;
            }
        });

        *self.handle.lock().unwrap() = Some(task);
        Ok(())
    }

    /// Stop the running loop, returning to the idle state.
    pub fn stop(&self) {
        if let Some(task) = self.handle.lock().unwrap().take() {
            task.abort();
            info!("Monitoring stopped");
        }
        self.active.store(false, Ordering::SeqCst);
    }
}

impl Drop for FolderMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

/// One polling tick: list the folder and download every unseen file.
///
/// A list failure counts as "no new files this tick". A failed download
/// is logged and the file is *not* marked seen, so it is retried next
/// tick; the remaining files of the tick still get their attempt. Only a
/// successful download adds a file id to the seen set.
pub async fn poll_tick(
    client: &dyn RemoteFolder,
    folder_id: &str,
    downloads_dir: &std::path::Path,
    seen: &mut HashSet<String>,
) {
    let files = match client.list_files(folder_id).await {
        Ok(files) => files,
        Err(e) => {
            error!("Error in monitor loop: {}", e);
            return;
        }
    };

    for file in files {
        if seen.contains(&file.id) {
            continue;
        }

        info!("New file detected: {}", file.name);
        let dest = downloads_dir.join(&file.name);

        match client.download_file(&file.id, &dest).await {
            Ok(bytes) => {
                seen.insert(file.id);
                info!("Downloaded: {} ({} bytes)", file.name, bytes);
            }
            Err(e) => {
                warn!("Download failed for {}, will retry next tick: {}", file.name, e);
            }
        }
    }
}
