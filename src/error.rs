//! Error types for lector operations.

use thiserror::Error;

/// Message shown when a stored book cannot be found or opened.
pub const BOOK_UNAVAILABLE_MESSAGE: &str = "Book not found or unreadable.";

/// Message shown when an uploaded file is rejected.
pub const UPLOAD_REJECTED_MESSAGE: &str = "Failed to upload file. Please ensure it's a valid EPUB file.";

/// Book-level failures surfaced to callers.
///
/// Per-unit extraction problems are [`UnitError`]s instead and never escalate
/// to this type.
#[derive(Error, Debug)]
pub enum Error {
    /// The container itself cannot be opened or parsed.
    #[error("file is not a valid book: {0}")]
    UnreadableDocument(String),

    /// Every content unit was skipped or empty.
    #[error("this book has no readable text")]
    NoReadableContent,

    /// The persistence layer has no record (or no raw bytes) for an id.
    #[error("book not found: {0}")]
    BookNotFound(String),

    /// A progress or record write did not reach the store.
    #[error("failed to persist book data: {0}")]
    PersistenceWriteFailed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// The user-facing message for this failure.
    ///
    /// Only two messages are ever shown: one for books that cannot be found
    /// or read, one for rejected uploads.
    pub fn user_message(&self) -> &'static str {
        match self {
            Error::UnreadableDocument(_) | Error::NoReadableContent => UPLOAD_REJECTED_MESSAGE,
            _ => BOOK_UNAVAILABLE_MESSAGE,
        }
    }
}

/// Reason a single content unit produced no chapter.
///
/// Recorded and logged, never propagated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnitError {
    #[error("entry not found in archive: {0}")]
    MissingEntry(String),

    #[error("unit is not a markup document ({0})")]
    NotMarkup(String),

    #[error("failed to read unit: {0}")]
    Read(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        assert_eq!(
            Error::UnreadableDocument("bad zip".into()).user_message(),
            UPLOAD_REJECTED_MESSAGE
        );
        assert_eq!(Error::NoReadableContent.user_message(), UPLOAD_REJECTED_MESSAGE);
        assert_eq!(
            Error::BookNotFound("abc".into()).user_message(),
            BOOK_UNAVAILABLE_MESSAGE
        );
    }

    #[test]
    fn test_display() {
        let err = Error::UnreadableDocument("missing container.xml".into());
        assert_eq!(
            err.to_string(),
            "file is not a valid book: missing container.xml"
        );
        assert_eq!(
            Error::NoReadableContent.to_string(),
            "this book has no readable text"
        );
    }
}
