//! Library tests.
//!
//! Importing into a directory-backed store, resuming reading sessions and
//! removing books.

mod common;

use std::time::Duration;

use common::EpubBuilder;
use lector::{
    BookStore, Error, FileStore, Position, ReaderConfig, ReadingSession, import_book, list_books,
    open_stored_book, remove_book,
};
use tempfile::TempDir;

fn novel() -> Vec<u8> {
    let long: Vec<String> = (0..200).map(|i| format!("word{i}")).collect();
    EpubBuilder::new("A Novel")
        .author("Some Writer")
        .chapter("Opening", "<p>It begins here.</p>")
        .chapter("Middle", &format!("<p>{}</p>", long.join(" ")))
        .chapter("Ending", "<p>And so it ends.</p>")
        .cover("images/cover.png", b"\x89PNG\r\n\x1a\nrest")
        .build()
}

fn library() -> (TempDir, FileStore) {
    let dir = TempDir::new().unwrap();
    let store = FileStore::open(dir.path()).unwrap();
    (dir, store)
}

// ============================================================================
// Import and listing
// ============================================================================

#[test]
fn test_import_and_list() {
    let (_dir, store) = library();
    let record = import_book(&store, novel(), "novel.epub").unwrap();

    assert_eq!(record.title, "A Novel");
    assert_eq!(record.author, "Some Writer");
    assert!(record.cover.as_deref().unwrap().starts_with("data:image/png;base64,"));
    assert_eq!(record.progress.percentage, 0.0);
    assert_eq!(record.last_read_at, None);

    let listed = list_books(&store).unwrap();
    assert_eq!(listed, vec![record]);
}

#[test]
fn test_reimport_has_same_id() {
    let (_dir, store) = library();
    let first = import_book(&store, novel(), "a.epub").unwrap();
    let second = import_book(&store, novel(), "b.epub").unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(list_books(&store).unwrap().len(), 1);
}

#[test]
fn test_rejected_upload_leaves_library_unchanged() {
    let (_dir, store) = library();
    let err = import_book(&store, b"PK\x03\x04 broken".to_vec(), "bad.epub").unwrap_err();
    assert_eq!(
        err.user_message(),
        "Failed to upload file. Please ensure it's a valid EPUB file."
    );
    assert!(list_books(&store).unwrap().is_empty());
}

// ============================================================================
// Reading sessions
// ============================================================================

#[test]
fn test_session_progress_survives_reopen() {
    let (dir, store) = library();
    let id = import_book(&store, novel(), "novel.epub").unwrap().id;
    let config = ReaderConfig {
        default_wpm: 600,
        ..Default::default()
    };

    {
        let (_, book) = open_stored_book(&store, &id).unwrap();
        let mut session = ReadingSession::new(&store, &id, book, &config);
        assert!(session.next_chapter());
        session.engine_mut().play(Duration::ZERO);
        // 100 ms per word: 50 words in 5 s, then an autosave
        session.tick(Duration::from_secs(5));
        assert_eq!(session.engine().position(), Position::new(1, 50));
    }

    // a fresh store over the same directory sees the saved progress
    let reopened = FileStore::open(dir.path()).unwrap();
    let (record, book) = open_stored_book(&reopened, &id).unwrap();
    assert_eq!(book.initial_position, Position::new(1, 50));
    assert!(record.last_read_at.is_some());
    // 3 words before, 50 read, 3 + 200 + 4 in total
    let expected = 53.0 / 207.0 * 100.0;
    assert!((record.progress.percentage - expected).abs() < 1e-9);
}

#[test]
fn test_finish_saves_final_position() {
    let (_dir, store) = library();
    let id = import_book(&store, novel(), "novel.epub").unwrap().id;

    let (_, book) = open_stored_book(&store, &id).unwrap();
    let mut session = ReadingSession::new(&store, &id, book, &ReaderConfig::default());
    session.go_to_chapter(2);
    session.engine_mut().seek(3);
    assert!(session.finish());

    let record = store.load_book(&id).unwrap().unwrap();
    assert_eq!(record.progress.position, Position::new(2, 3));
    assert_eq!(record.progress.percentage, 100.0);
}

// ============================================================================
// Removal
// ============================================================================

#[test]
fn test_remove_book() {
    let (_dir, store) = library();
    let id = import_book(&store, novel(), "novel.epub").unwrap().id;

    assert!(remove_book(&store, &id).unwrap());
    assert!(!remove_book(&store, &id).unwrap());
    assert!(matches!(open_stored_book(&store, &id), Err(Error::BookNotFound(_))));
    assert_eq!(
        Error::BookNotFound(id).user_message(),
        "Book not found or unreadable."
    );
}

#[test]
fn test_progress_after_removal_is_dropped() {
    let (_dir, store) = library();
    let id = import_book(&store, novel(), "novel.epub").unwrap().id;
    let (_, book) = open_stored_book(&store, &id).unwrap();
    let mut session = ReadingSession::new(&store, &id, book, &ReaderConfig::default());

    remove_book(&store, &id).unwrap();
    assert!(session.next_chapter());
    assert!(session.finish());
    assert_eq!(store.load_book(&id).unwrap(), None);
}
