use serde::{Deserialize, Serialize};

/// Library record for an uploaded book.
///
/// Owned by the persistence layer; the reading engine only reads it and
/// produces new [`Progress`] values for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookRecord {
    pub id: String,
    pub title: String,
    pub author: String,
    /// Cover image as a `data:` URL.
    pub cover: Option<String>,
    /// Milliseconds since the Unix epoch.
    pub added_at: u64,
    pub last_read_at: Option<u64>,
    pub progress: Progress,
}

/// Book metadata read from the package document (Dublin Core subset).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub title: String,
    pub authors: Vec<String>,
    pub language: String,
    pub identifier: String,
    /// Href of the cover image, relative to the package document.
    pub cover_image: Option<String>,
}

/// A node of the navigation tree (table of contents).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavPoint {
    pub href: String,
    pub label: String,
    pub children: Vec<NavPoint>,
}

/// One readable chapter: a content unit that produced at least one word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    /// The content unit's reference.
    pub id: String,
    pub title: String,
    pub href: String,
    /// Normalized text of the unit.
    pub content: String,
    pub words: Vec<String>,
}

/// A navigation position: chapter index and word index, both 0-based.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub chapter_index: usize,
    pub word_index: usize,
}

/// A position plus whole-book completion in `[0, 100]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    #[serde(flatten)]
    pub position: Position,
    pub percentage: f64,
}

impl BookRecord {
    /// A fresh record with zeroed progress.
    pub fn new(id: impl Into<String>, title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            author: author.into(),
            cover: None,
            added_at: crate::util::time_now_millis(),
            last_read_at: None,
            progress: Progress::default(),
        }
    }

    pub fn with_cover(mut self, cover: Option<String>) -> Self {
        self.cover = cover;
        self
    }
}

impl Metadata {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.authors.push(author.into());
        self
    }

    /// First listed author, if any.
    pub fn author(&self) -> Option<&str> {
        self.authors.first().map(String::as_str)
    }
}

impl NavPoint {
    pub fn new(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            label: label.into(),
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: NavPoint) -> Self {
        self.children.push(child);
        self
    }
}

impl Chapter {
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Position {
    pub const fn new(chapter_index: usize, word_index: usize) -> Self {
        Self {
            chapter_index,
            word_index,
        }
    }
}
