//! Shared application state.

use std::sync::{Arc, Mutex};

use dropscan_core::error::OcrError;
use dropscan_core::ocr::{create_backend, BackendKind, OcrBackend};
use dropscan_core::sync::{DriveClient, FolderMonitor};
use dropscan_core::DropscanConfig;

/// State shared by all request handlers and the monitor loop.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<DropscanConfig>,
    pub drive: Arc<DriveClient>,
    pub monitor: Arc<FolderMonitor>,
    /// The neural backend loads its models at construction, so the first
    /// successful instance is cached and shared across requests.
    neural: Arc<Mutex<Option<Arc<dyn OcrBackend>>>>,
}

impl AppState {
    pub fn new(config: DropscanConfig, drive: DriveClient) -> Self {
        Self {
            config: Arc::new(config),
            drive: Arc::new(drive),
            monitor: Arc::new(FolderMonitor::new()),
            neural: Arc::new(Mutex::new(None)),
        }
    }

    /// Resolve a backend for one extraction request.
    ///
    /// Local and remote backends are cheap and built per request (the
    /// remote one is bound to the request's own API key). The neural
    /// backend is constructed once and reused.
    pub fn backend(
        &self,
        kind: BackendKind,
        api_key: Option<&str>,
    ) -> Result<Arc<dyn OcrBackend>, OcrError> {
        if kind == BackendKind::Neural {
            let mut cached = self.neural.lock().unwrap();
            if let Some(backend) = cached.as_ref() {
                return Ok(Arc::clone(backend));
            }
            let backend = create_backend(kind, &self.config.ocr, None)?;
            *cached = Some(Arc::clone(&backend));
            return Ok(backend);
        }

        create_backend(kind, &self.config.ocr, api_key)
    }
}
