//! Importing, opening and removing books.

use crate::book::{BookRecord, Chapter, Position};
use crate::document::Document;
use crate::epub::EpubDocument;
use crate::error::{Error, Result};
use crate::extract::extract_chapters;
use crate::progress::restore_position;
use crate::store::BookStore;
use crate::util::{data_url, sha1_hex};

/// Author shown when the package names none.
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// A book ready to read: its chapters and where to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedBook {
    pub chapters: Vec<Chapter>,
    pub initial_position: Position,
}

/// Import an uploaded EPUB into `store`.
///
/// The book id is the SHA-1 of its bytes, so importing the same file twice
/// replaces the earlier record (resetting its progress). Files that cannot be
/// opened, or that contain no readable text, are rejected.
pub fn import_book(store: &dyn BookStore, bytes: Vec<u8>, file_name: &str) -> Result<BookRecord> {
    let id = sha1_hex(&bytes);
    let mut doc = EpubDocument::open(bytes.clone())?;

    if extract_chapters(&mut doc).is_empty() {
        return Err(Error::NoReadableContent);
    }

    let metadata = doc.metadata();
    let title = match metadata.title.trim() {
        "" => title_from_file_name(file_name),
        title => title.to_string(),
    };
    let author = metadata
        .author()
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .unwrap_or(UNKNOWN_AUTHOR)
        .to_string();
    let cover = doc
        .cover_image()
        .map(|cover| data_url(&cover.media_type, &cover.data));
    doc.close();

    let record = BookRecord::new(id, title, author).with_cover(cover);
    store.save_book(&record, &bytes)?;
    log::info!("imported {:?} by {} as {}", record.title, record.author, record.id);
    Ok(record)
}

/// `file_name` without a trailing `.epub`.
fn title_from_file_name(file_name: &str) -> String {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    base.strip_suffix(".epub").unwrap_or(base).to_string()
}

/// Open raw EPUB bytes for reading from the start.
pub fn open_book(bytes: Vec<u8>) -> Result<OpenedBook> {
    let mut doc = EpubDocument::open(bytes)?;
    let chapters = extract_chapters(&mut doc);
    doc.close();

    if chapters.is_empty() {
        return Err(Error::NoReadableContent);
    }
    Ok(OpenedBook {
        chapters,
        initial_position: Position::default(),
    })
}

/// Open a stored book at its saved position.
///
/// The saved position is clamped to the freshly extracted chapters, so a
/// record written against a different extraction still opens.
pub fn open_stored_book(store: &dyn BookStore, id: &str) -> Result<(BookRecord, OpenedBook)> {
    let record = store
        .load_book(id)?
        .ok_or_else(|| Error::BookNotFound(id.to_string()))?;
    let bytes = store
        .load_raw_bytes(id)?
        .ok_or_else(|| Error::BookNotFound(id.to_string()))?;

    let mut opened = open_book(bytes)?;
    opened.initial_position = restore_position(&record.progress, &opened.chapters);
    log::info!(
        "opened {:?} at chapter {}, word {}",
        record.title,
        opened.initial_position.chapter_index,
        opened.initial_position.word_index
    );
    Ok((record, opened))
}

pub fn list_books(store: &dyn BookStore) -> Result<Vec<BookRecord>> {
    store.list_books()
}

/// Delete a book. Returns whether it existed.
pub fn remove_book(store: &dyn BookStore, id: &str) -> Result<bool> {
    store.delete_book(id)
}
