use qrscan_types::ScanResult;

use crate::error::HistoryError;
use crate::storage::Storage;

/// Storage key of the persisted log
pub const HISTORY_STORAGE_KEY: &str = "qr_scan_history";

/// Most recent entries kept
pub const HISTORY_CAPACITY: usize = 50;

/// Bounded, newest-first scan log with write-through persistence
pub struct HistoryStore<S: Storage> {
    storage: S,
    log: Vec<ScanResult>,
}

impl<S: Storage> HistoryStore<S> {
    /// Open the store and load whatever was persisted
    pub fn open(storage: S) -> Self {
        let mut store = Self {
            storage,
            log: Vec::new(),
        };
        store.load();
        store
    }

    /// Re-read the persisted log. Missing or corrupt data yields an empty log.
    pub fn load(&mut self) -> &[ScanResult] {
        self.log = match self.storage.get(HISTORY_STORAGE_KEY) {
            Ok(Some(data)) => match serde_json::from_str::<Vec<ScanResult>>(&data) {
                Ok(mut log) => {
                    log.truncate(HISTORY_CAPACITY);
                    log
                }
                Err(e) => {
                    tracing::warn!("Discarding unreadable history: {e}");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read history, starting empty: {e}");
                Vec::new()
            }
        };

        tracing::debug!("Loaded {} history entries", self.log.len());
        &self.log
    }

    /// Prepend `entry`, evict past capacity and persist.
    ///
    /// The in-memory log is updated even when the write fails, so the
    /// session keeps working with what the user just scanned.
    pub fn append(&mut self, entry: ScanResult) -> Result<&[ScanResult], HistoryError> {
        self.log.insert(0, entry);
        self.log.truncate(HISTORY_CAPACITY);

        let data = serde_json::to_string(&self.log)?;
        self.storage.set(HISTORY_STORAGE_KEY, &data)?;

        Ok(&self.log)
    }

    /// Drop every entry and the persisted blob. Callers confirm with the user first.
    pub fn clear(&mut self) -> Result<(), HistoryError> {
        self.log.clear();
        self.storage.remove(HISTORY_STORAGE_KEY)?;
        Ok(())
    }

    pub fn entries(&self) -> &[ScanResult] {
        &self.log
    }

    pub fn get(&self, index: usize) -> Option<&ScanResult> {
        self.log.get(index)
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }
}
