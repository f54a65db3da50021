pub mod classify;
pub mod error;
pub mod history;
pub mod storage;

pub use classify::classify;
pub use error::{HistoryError, StorageError};
pub use history::{HISTORY_CAPACITY, HISTORY_STORAGE_KEY, HistoryStore};
pub use storage::{FileStorage, MemoryStorage, Storage};
