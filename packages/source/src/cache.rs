//! Single-entry cache for the most recent dataset load.
//!
//! Every dashboard interaction asks for the same file with a row limit.
//! The cache remembers the last load keyed by `(path, row cap)` and the
//! file's modification time, and only goes back to disk when one of them
//! changes. A new key replaces the old entry.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::SystemTime;

use crate::SourceError;
use crate::limit::RowLimit;
use crate::loader::{LoadedRecords, load};
use crate::progress::ProgressCallback;

/// Identity of a cached load.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Dataset path as requested.
    pub path: PathBuf,
    /// Resolved row cap.
    pub row_cap: u64,
}

struct CacheEntry {
    key: CacheKey,
    modified: Option<SystemTime>,
    records: Arc<LoadedRecords>,
}

/// Remembers the most recent load.
///
/// The lock is held for the duration of a load, so concurrent requests for
/// the same key wait for one read instead of each reading the file.
#[derive(Default)]
pub struct RecordCache {
    slot: Mutex<Option<CacheEntry>>,
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

impl RecordCache {
    /// Creates an empty cache.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Returns the cached load for `(path, limit)`, loading it on a miss.
    ///
    /// `prepare` runs once on freshly loaded records before they are cached
    /// (e.g. label normalization), so hits skip it as well.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if a fresh load fails. A failed load leaves
    /// the previous entry in place.
    pub fn get_or_load<F>(
        &self,
        path: &Path,
        limit: RowLimit,
        max_rows: u64,
        progress: &Arc<dyn ProgressCallback>,
        prepare: F,
    ) -> Result<Arc<LoadedRecords>, SourceError>
    where
        F: FnOnce(LoadedRecords) -> LoadedRecords,
    {
        let key = CacheKey {
            path: path.to_path_buf(),
            row_cap: limit.resolve(max_rows),
        };
        let modified = modified_time(path);

        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(entry) = slot.as_ref()
            && entry.key == key
            && entry.modified == modified
            && modified.is_some()
        {
            log::debug!(
                "Serving {} rows of {} from cache",
                entry.records.records.len(),
                path.display()
            );
            return Ok(Arc::clone(&entry.records));
        }

        let records = Arc::new(prepare(load(path, limit, max_rows, progress)?));

        *slot = Some(CacheEntry {
            key,
            modified,
            records: Arc::clone(&records),
        });

        Ok(records)
    }

    /// Returns the key of the cached load, if any.
    #[must_use]
    pub fn cached_key(&self) -> Option<CacheKey> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|entry| entry.key.clone())
    }

    /// Drops the cached load.
    pub fn invalidate(&self) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
