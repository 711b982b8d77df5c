use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{BookStore, sort_newest_first};
use crate::book::{BookRecord, Progress};
use crate::error::{Error, Result};
use crate::util::time_now_millis;

#[derive(Debug, Default)]
struct Inner {
    records: HashMap<String, BookRecord>,
    files: HashMap<String, Vec<u8>>,
    fail_writes: bool,
    progress_writes: usize,
}

/// In-memory store, mainly for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every following write fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    /// Number of successful progress writes so far.
    pub fn progress_writes(&self) -> usize {
        self.lock().progress_writes
    }
}

impl BookStore for MemoryStore {
    fn load_book(&self, id: &str) -> Result<Option<BookRecord>> {
        Ok(self.lock().records.get(id).cloned())
    }

    fn load_raw_bytes(&self, id: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.lock().files.get(id).cloned())
    }

    fn save_book(&self, record: &BookRecord, bytes: &[u8]) -> Result<()> {
        let mut inner = self.lock();
        if inner.fail_writes {
            return Err(Error::PersistenceWriteFailed(format!("book {}", record.id)));
        }
        inner.files.insert(record.id.clone(), bytes.to_vec());
        inner.records.insert(record.id.clone(), record.clone());
        Ok(())
    }

    fn save_progress(&self, id: &str, progress: Progress) -> Result<()> {
        let mut inner = self.lock();
        if inner.fail_writes {
            return Err(Error::PersistenceWriteFailed(format!("progress {id}")));
        }
        let Some(record) = inner.records.get_mut(id) else {
            return Ok(());
        };
        record.progress = progress;
        record.last_read_at = Some(time_now_millis());
        inner.progress_writes += 1;
        Ok(())
    }

    fn list_books(&self) -> Result<Vec<BookRecord>> {
        let mut records: Vec<_> = self.lock().records.values().cloned().collect();
        sort_newest_first(&mut records);
        Ok(records)
    }

    fn delete_book(&self, id: &str) -> Result<bool> {
        let mut inner = self.lock();
        let had_record = inner.records.remove(id).is_some();
        let had_bytes = inner.files.remove(id).is_some();
        Ok(had_record || had_bytes)
    }
}
