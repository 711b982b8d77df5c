//! # lector
//!
//! A speed-reading engine for EPUB books.
//!
//! ## Features
//!
//! - Open EPUB 2/3 files and extract readable chapters as word lists
//! - Word-by-word (RSVP) playback with optimal recognition point alignment
//! - Reading progress as a position and a whole-book percentage
//! - A small local library with resumable progress
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//! use lector::{PlaybackEngine, open_book};
//!
//! let bytes = std::fs::read("book.epub").unwrap();
//! let book = open_book(bytes).unwrap();
//!
//! let mut engine = PlaybackEngine::new(book.chapters).with_wpm(400);
//! engine.play(Duration::ZERO);
//! engine.advance(Duration::from_secs(3));
//! println!("{:?}", engine.current_word());
//! ```
//!
//! ## Keeping a library
//!
//! Books imported into a [`BookStore`] keep their progress between sessions:
//!
//! ```no_run
//! use lector::{FileStore, ReaderConfig, ReadingSession, import_book, open_stored_book};
//!
//! let bytes = std::fs::read("book.epub").unwrap();
//! let store = FileStore::open(".lector").unwrap();
//! let record = import_book(&store, bytes, "book.epub").unwrap();
//!
//! let (_, book) = open_stored_book(&store, &record.id).unwrap();
//! let mut session = ReadingSession::new(&store, &record.id, book, &ReaderConfig::default());
//! session.next_chapter();
//! session.finish();
//! ```

pub mod book;
pub mod config;
pub mod document;
pub mod epub;
pub mod error;
pub mod extract;
pub mod library;
pub mod markup;
pub mod orp;
pub mod playback;
pub mod progress;
pub mod session;
pub mod store;
pub mod text_view;
pub mod tokenize;
pub(crate) mod util;

pub use book::{BookRecord, Chapter, Metadata, NavPoint, Position, Progress};
pub use config::ReaderConfig;
pub use document::{ContentUnit, Document};
pub use epub::EpubDocument;
pub use error::{Error, Result, UnitError};
pub use extract::extract_chapters;
pub use library::{OpenedBook, import_book, list_books, open_book, open_stored_book, remove_book};
pub use orp::{orp, split_word};
pub use playback::{PlaybackEngine, PlaybackEvent, PlaybackState};
pub use progress::compute_percentage;
pub use session::ReadingSession;
pub use store::{BookStore, FileStore, MemoryStore};
pub use text_view::TextView;
pub use tokenize::tokenize;

