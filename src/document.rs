//! The document abstraction the chapter extractor reads from.

use crate::book::{Metadata, NavPoint};
use crate::error::UnitError;

/// One spine item: an independently renderable piece of content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentUnit {
    /// Href of the unit, relative to the package document.
    pub reference: String,
    pub media_type: String,
}

impl ContentUnit {
    pub fn new(reference: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            media_type: media_type.into(),
        }
    }

    /// Whether the unit declares a markup media type.
    ///
    /// Units with no declared type are given the benefit of the doubt.
    pub fn is_markup(&self) -> bool {
        matches!(
            self.media_type.as_str(),
            "" | "application/xhtml+xml" | "text/html" | "application/xml" | "text/xml"
        )
    }
}

/// An opened e-book.
///
/// Units come back in reading order. Rendering one unit never affects the
/// others: a failure is reported for that unit alone.
pub trait Document {
    fn metadata(&self) -> &Metadata;

    /// Navigation tree (table of contents). May be empty.
    fn navigation(&self) -> &[NavPoint];

    fn content_units(&self) -> &[ContentUnit];

    /// Render a unit to markup text.
    fn render(&mut self, unit: &ContentUnit) -> Result<String, UnitError>;

    /// Release the document.
    fn close(self)
    where
        Self: Sized,
    {
    }
}
