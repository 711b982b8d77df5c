use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::{BookStore, sort_newest_first};
use crate::book::{BookRecord, Progress};
use crate::error::{Error, Result};
use crate::util::time_now_millis;

/// Directory-backed store.
///
/// ```text
/// <dir>/books/<id>.json   record
/// <dir>/files/<id>.epub   raw bytes
/// ```
///
/// Every write goes to a temporary file first and is renamed into place, so
/// a crash never leaves a half-written record.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let root = dir.into();
        fs::create_dir_all(root.join("books"))?;
        fs::create_dir_all(root.join("files"))?;
        log::debug!("opened file store at {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, id: &str) -> PathBuf {
        self.root.join("books").join(format!("{id}.json"))
    }

    fn bytes_path(&self, id: &str) -> PathBuf {
        self.root.join("files").join(format!("{id}.epub"))
    }

    fn write_record(&self, record: &BookRecord) -> Result<()> {
        let json = serde_json::to_vec_pretty(record)?;
        write_atomic(&self.record_path(&record.id), &json)
            .map_err(|e| Error::PersistenceWriteFailed(format!("record {}: {e}", record.id)))
    }
}

/// Ids become file names, so only plain names are accepted.
fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, data)?;
    fs::rename(&tmp, path)
}

fn read_optional(path: &Path) -> io::Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(data) => Ok(Some(data)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

fn remove_optional(path: &Path) -> io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

impl BookStore for FileStore {
    fn load_book(&self, id: &str) -> Result<Option<BookRecord>> {
        if !is_valid_id(id) {
            return Ok(None);
        }
        match read_optional(&self.record_path(id))? {
            Some(json) => Ok(Some(serde_json::from_slice(&json)?)),
            None => Ok(None),
        }
    }

    fn load_raw_bytes(&self, id: &str) -> Result<Option<Vec<u8>>> {
        if !is_valid_id(id) {
            return Ok(None);
        }
        Ok(read_optional(&self.bytes_path(id))?)
    }

    fn save_book(&self, record: &BookRecord, bytes: &[u8]) -> Result<()> {
        if !is_valid_id(&record.id) {
            return Err(Error::PersistenceWriteFailed(format!("invalid book id {:?}", record.id)));
        }
        // Bytes first: a record never points at missing bytes.
        write_atomic(&self.bytes_path(&record.id), bytes)
            .map_err(|e| Error::PersistenceWriteFailed(format!("file {}: {e}", record.id)))?;
        self.write_record(record)?;
        log::info!("saved book {} ({:?})", record.id, record.title);
        Ok(())
    }

    fn save_progress(&self, id: &str, progress: Progress) -> Result<()> {
        let Some(mut record) = self.load_book(id)? else {
            log::debug!("progress for unknown book {id} dropped");
            return Ok(());
        };
        record.progress = progress;
        record.last_read_at = Some(time_now_millis());
        self.write_record(&record)
    }

    fn list_books(&self) -> Result<Vec<BookRecord>> {
        let mut records = Vec::new();
        for entry in fs::read_dir(self.root.join("books"))? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let parsed = fs::read(&path)
                .map_err(Error::from)
                .and_then(|json| serde_json::from_slice::<BookRecord>(&json).map_err(Error::from));
            match parsed {
                Ok(record) => records.push(record),
                Err(e) => log::warn!("skipping unreadable record {}: {e}", path.display()),
            }
        }
        sort_newest_first(&mut records);
        Ok(records)
    }

    fn delete_book(&self, id: &str) -> Result<bool> {
        if !is_valid_id(id) {
            return Ok(false);
        }
        let had_record = remove_optional(&self.record_path(id))?;
        let had_bytes = remove_optional(&self.bytes_path(id))?;
        if had_record {
            log::info!("deleted book {id}");
        }
        Ok(had_record || had_bytes)
    }
}
