//! EPUB container reader.
//!
//! Opens an EPUB held in memory and exposes what the reading engine needs:
//! metadata, the navigation tree, the spine as [`ContentUnit`]s and the raw
//! markup of each unit.
//!
//! # Example
//!
//! ```no_run
//! use lector::document::Document;
//! use lector::epub::EpubDocument;
//!
//! let bytes = std::fs::read("book.epub")?;
//! let mut doc = EpubDocument::open(bytes)?;
//! println!("{}: {} units", doc.metadata().title, doc.content_units().len());
//! # Ok::<(), lector::Error>(())
//! ```

mod nav;
mod parser;
#[cfg(test)]
#[path = "../../tests/common/epub_builder.rs"]
pub(crate) mod test_support;

pub use nav::parse_nav_document;
pub use parser::{ManifestItem, OpfData, parse_container_xml, parse_ncx, parse_opf};

use std::io::{Cursor, Read};

use zip::ZipArchive;
use zip::result::ZipError;

use crate::book::{Metadata, NavPoint};
use crate::document::{ContentUnit, Document};
use crate::error::{Error, Result, UnitError};
use crate::util::{decode_document, detect_image_mime};

/// Cover image bytes and their MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverImage {
    pub data: Vec<u8>,
    pub media_type: String,
}

/// An EPUB opened from memory.
pub struct EpubDocument {
    archive: ZipArchive<Cursor<Vec<u8>>>,
    /// Directory of the OPF inside the archive, `""` at the root.
    opf_dir: String,
    metadata: Metadata,
    units: Vec<ContentUnit>,
    navigation: Vec<NavPoint>,
}

impl EpubDocument {
    /// Open an EPUB from its raw bytes.
    ///
    /// Fails with [`Error::UnreadableDocument`] when the archive, the
    /// container or the package document cannot be read. A missing or broken
    /// table of contents is not an error: navigation is then empty.
    pub fn open(bytes: Vec<u8>) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| Error::UnreadableDocument(format!("not a zip archive: {e}")))?;

        let container = read_entry(&mut archive, "META-INF/container.xml")
            .map_err(|e| Error::UnreadableDocument(format!("META-INF/container.xml: {e}")))?;
        let opf_path = parse_container_xml(&container).map_err(Error::UnreadableDocument)?;
        let opf_dir = parent_dir(&opf_path).to_string();

        let opf_bytes = read_entry(&mut archive, &opf_path)
            .map_err(|e| Error::UnreadableDocument(format!("{opf_path}: {e}")))?;
        let opf = parse_opf(&decode_document(&opf_bytes))
            .map_err(|e| Error::UnreadableDocument(format!("{opf_path}: {e}")))?;

        let mut units = Vec::with_capacity(opf.spine_ids.len());
        for id in &opf.spine_ids {
            match opf.manifest.get(id) {
                Some(item) => units.push(ContentUnit::new(&item.href, &item.media_type)),
                None => log::debug!("spine references unknown manifest id {id:?}"),
            }
        }

        let mut doc = Self {
            archive,
            opf_dir,
            metadata: opf.metadata,
            units,
            navigation: Vec::new(),
        };
        doc.navigation = doc.load_navigation(opf.nav_href.as_deref(), opf.ncx_href.as_deref());

        log::info!(
            "opened EPUB {:?}: {} spine items, {} top-level navigation entries",
            doc.metadata.title,
            doc.units.len(),
            doc.navigation.len()
        );
        Ok(doc)
    }

    /// Navigation document first, NCX as fallback.
    fn load_navigation(&mut self, nav_href: Option<&str>, ncx_href: Option<&str>) -> Vec<NavPoint> {
        if let Some(href) = nav_href {
            match self.read_text(href) {
                Ok(html) => {
                    let toc = parse_nav_document(&html);
                    if !toc.is_empty() {
                        return rebase(toc, href);
                    }
                    log::debug!("navigation document {href} has no toc entries");
                }
                Err(e) => log::debug!("navigation document {href} unreadable: {e}"),
            }
        }

        if let Some(href) = ncx_href {
            match self.read_text(href).map(|xml| parse_ncx(&xml)) {
                Ok(Ok(toc)) => return rebase(toc, href),
                Ok(Err(e)) => log::debug!("NCX {href} malformed: {e}"),
                Err(e) => log::debug!("NCX {href} unreadable: {e}"),
            }
        }

        Vec::new()
    }

    /// Read an entry given by an OPF-relative href, decoded to text.
    fn read_text(&mut self, href: &str) -> std::io::Result<String> {
        let bytes = self.read_bytes(href)?;
        Ok(decode_document(&bytes).into_owned())
    }

    fn read_bytes(&mut self, href: &str) -> std::io::Result<Vec<u8>> {
        let path = resolve_relative_path(&format!("{}/", self.opf_dir), href);
        read_entry(&mut self.archive, &path)
    }

    /// The cover image, if the package declares one and it can be read.
    pub fn cover_image(&mut self) -> Option<CoverImage> {
        let href = self.metadata.cover_image.clone()?;
        let data = match self.read_bytes(&href) {
            Ok(data) => data,
            Err(e) => {
                log::debug!("cover image {href} unreadable: {e}");
                return None;
            }
        };
        let media_type = detect_image_mime(&href, &data)?.to_string();
        Some(CoverImage { data, media_type })
    }
}

impl Document for EpubDocument {
    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn navigation(&self) -> &[NavPoint] {
        &self.navigation
    }

    fn content_units(&self) -> &[ContentUnit] {
        &self.units
    }

    fn render(&mut self, unit: &ContentUnit) -> std::result::Result<String, UnitError> {
        if !unit.is_markup() {
            return Err(UnitError::NotMarkup(unit.media_type.clone()));
        }
        self.read_text(&unit.reference).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => UnitError::MissingEntry(unit.reference.clone()),
            _ => UnitError::Read(e.to_string()),
        })
    }

    fn close(self) {
        log::debug!("closed EPUB {:?}", self.metadata.title);
    }
}

/// Read an archive entry, retrying with the percent-decoded name.
fn read_entry(archive: &mut ZipArchive<Cursor<Vec<u8>>>, path: &str) -> std::io::Result<Vec<u8>> {
    match read_exact_entry(archive, path) {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            let decoded = percent_encoding::percent_decode_str(path).decode_utf8_lossy();
            if decoded == path {
                return Err(e);
            }
            read_exact_entry(archive, &decoded)
        }
        other => other,
    }
}

fn read_exact_entry(archive: &mut ZipArchive<Cursor<Vec<u8>>>, path: &str) -> std::io::Result<Vec<u8>> {
    let mut file = archive.by_name(path).map_err(|e| match e {
        ZipError::FileNotFound => {
            std::io::Error::new(std::io::ErrorKind::NotFound, format!("{path} not in archive"))
        }
        ZipError::Io(e) => e,
        other => std::io::Error::other(other),
    })?;
    let mut contents = Vec::new();
    file.read_to_end(&mut contents)?;
    Ok(contents)
}

fn parent_dir(path: &str) -> &str {
    path.rfind('/').map(|i| &path[..i]).unwrap_or("")
}

/// Express navigation hrefs, written relative to `nav_href`, relative to the
/// package document like the spine references.
fn rebase(points: Vec<NavPoint>, nav_href: &str) -> Vec<NavPoint> {
    points
        .into_iter()
        .map(|point| NavPoint {
            href: if point.href.is_empty() {
                point.href
            } else {
                resolve_relative_path(nav_href, &point.href)
            },
            label: point.label,
            children: rebase(point.children, nav_href),
        })
        .collect()
}

/// Resolve `href` against the file `base`, keeping any fragment.
///
/// `base` names a file: its last component is dropped. A base ending in `/`
/// is a directory. Absolute hrefs are taken from the archive root and URLs
/// are returned unchanged.
///
/// ```
/// use lector::epub::resolve_relative_path;
///
/// assert_eq!(resolve_relative_path("nav/toc.xhtml", "../text/ch1.xhtml#p2"), "text/ch1.xhtml#p2");
/// assert_eq!(resolve_relative_path("OEBPS/", "ch1.xhtml"), "OEBPS/ch1.xhtml");
/// assert_eq!(resolve_relative_path("toc.ncx", "ch1.xhtml"), "ch1.xhtml");
/// ```
pub fn resolve_relative_path(base: &str, href: &str) -> String {
    if href.contains("://") || href.starts_with("data:") {
        return href.to_string();
    }

    let (path, fragment) = match href.split_once('#') {
        Some((path, fragment)) => (path, Some(fragment)),
        None => (href, None),
    };

    if path.is_empty() {
        let base = base.split_once('#').map_or(base, |(file, _)| file);
        return match fragment {
            Some(fragment) => format!("{base}#{fragment}"),
            None => base.to_string(),
        };
    }

    let mut stack: Vec<&str> = if path.starts_with('/') {
        Vec::new()
    } else {
        parent_dir(base).split('/').filter(|s| !s.is_empty()).collect()
    };

    for component in path.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                stack.pop();
            }
            c => stack.push(c),
        }
    }

    let mut resolved = stack.join("/");
    if let Some(fragment) = fragment {
        resolved.push('#');
        resolved.push_str(fragment);
    }
    resolved
}
