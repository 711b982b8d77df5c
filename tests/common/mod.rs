pub mod epub_builder;

pub use epub_builder::{EpubBuilder, xhtml};
