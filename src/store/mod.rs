//! Persistence of book records, raw book bytes and reading progress.
//!
//! Two implementations: [`FileStore`] keeps one JSON record and one EPUB file
//! per book under a data directory, [`MemoryStore`] keeps everything in
//! memory and can simulate write failures.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::sync::OnceLock;

use crate::book::{BookRecord, Progress};
use crate::config::ReaderConfig;
use crate::error::Result;

/// Storage for the library.
///
/// Lookups of unknown ids are `Ok(None)`, not errors. Failed writes are
/// [`Error::PersistenceWriteFailed`](crate::Error::PersistenceWriteFailed).
pub trait BookStore: Send + Sync {
    fn load_book(&self, id: &str) -> Result<Option<BookRecord>>;

    fn load_raw_bytes(&self, id: &str) -> Result<Option<Vec<u8>>>;

    /// Insert or replace a record together with the book's bytes.
    fn save_book(&self, record: &BookRecord, bytes: &[u8]) -> Result<()>;

    /// Replace a book's progress and stamp `last_read_at`.
    ///
    /// Saving progress for a book that no longer exists does nothing.
    fn save_progress(&self, id: &str, progress: Progress) -> Result<()>;

    /// Every record, most recently added first.
    fn list_books(&self) -> Result<Vec<BookRecord>>;

    /// Remove a book's record and bytes. Returns whether it existed.
    fn delete_book(&self, id: &str) -> Result<bool>;
}

static GLOBAL: OnceLock<FileStore> = OnceLock::new();

/// The process-wide store, opened at the configured data directory on first
/// use. Later calls return the same store whatever `config` says.
pub fn global(config: &ReaderConfig) -> Result<&'static FileStore> {
    if let Some(store) = GLOBAL.get() {
        return Ok(store);
    }
    let store = FileStore::open(config.resolve_data_dir())?;
    Ok(GLOBAL.get_or_init(|| store))
}

/// Newest first; ties broken by id so listings are stable.
fn sort_newest_first(records: &mut [BookRecord]) {
    records.sort_by(|a, b| b.added_at.cmp(&a.added_at).then_with(|| a.id.cmp(&b.id)));
}
