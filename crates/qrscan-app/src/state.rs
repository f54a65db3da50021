use std::sync::Arc;

use qrscan_config::Config;
use qrscan_core::{FileStorage, Storage};
use qrscan_io::{ClipboardWriter, LinkOpener, SystemClipboard, SystemOpener};
use qrscan_scanner::{ScannerBackend, VideoSink};
use tokio::sync::RwLock;

use crate::backend::build_scanner_backend;

pub struct AppState {
    pub config: Arc<RwLock<Config>>,
    pub storage: Arc<dyn Storage>,
    pub scanner: ScannerBackend,
    pub clipboard: Arc<dyn ClipboardWriter>,
    pub links: Arc<dyn LinkOpener>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let scanner = build_scanner_backend(&config)?;
        let storage = Arc::new(FileStorage::new(config.history.data_dir.clone()));
        tracing::info!("History stored in {}", storage.root().display());

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            storage,
            scanner,
            clipboard: Arc::new(SystemClipboard::new()),
            links: Arc::new(SystemOpener),
        })
    }

    /// Backend for a new session; each session gets its own video sink
    pub fn scanner_backend(&self) -> ScannerBackend {
        ScannerBackend {
            sink: Arc::new(VideoSink::new()),
            ..self.scanner.clone()
        }
    }
}
