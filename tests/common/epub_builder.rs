//! In-memory EPUB fixtures.
//!
//! Shared by the unit tests (through `#[path]`), the integration tests and
//! the benchmarks.

#![allow(dead_code)]

use std::io::{Cursor, Write};

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

struct Entry {
    /// Path inside `OEBPS/`.
    path: String,
    /// Href written in the manifest.
    href: String,
    media_type: String,
    body: Vec<u8>,
    /// Navigation label; `None` keeps the entry out of the table of contents.
    label: Option<String>,
}

/// Builds EPUB 3 archives with a nav document (in `nav/`) and an NCX.
pub struct EpubBuilder {
    title: String,
    authors: Vec<String>,
    entries: Vec<Entry>,
    cover: Option<(String, Vec<u8>)>,
    nav_document: bool,
    ncx: bool,
    container: bool,
    ncx_label_suffix: String,
}

impl EpubBuilder {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            authors: Vec::new(),
            entries: Vec::new(),
            cover: None,
            nav_document: true,
            ncx: true,
            container: true,
            ncx_label_suffix: String::new(),
        }
    }

    pub fn author(mut self, author: &str) -> Self {
        self.authors.push(author.to_string());
        self
    }

    /// Add a chapter at `text/chN.xhtml` with a table of contents entry.
    pub fn chapter(self, label: &str, body: &str) -> Self {
        let n = self.entries.len() + 1;
        let path = format!("text/ch{n}.xhtml");
        self.entry(&path, &path, "application/xhtml+xml", xhtml(label, body).into_bytes(), Some(label))
    }

    /// Add a chapter that has no table of contents entry.
    pub fn untitled_chapter(self, body: &str) -> Self {
        let n = self.entries.len() + 1;
        let path = format!("text/ch{n}.xhtml");
        self.entry(&path, &path, "application/xhtml+xml", xhtml("", body).into_bytes(), None)
    }

    /// Add a chapter stored at `path` but referenced as `href`.
    pub fn raw_chapter(self, path: &str, href: &str, body: &str) -> Self {
        self.entry(path, href, "application/xhtml+xml", xhtml("", body).into_bytes(), None)
    }

    /// Add a spine item with arbitrary content and media type.
    pub fn spine_item(self, path: &str, media_type: &str, body: &[u8]) -> Self {
        self.entry(path, path, media_type, body.to_vec(), None)
    }

    /// Add a manifest and spine entry whose file is absent from the archive.
    pub fn missing_chapter(mut self, path: &str) -> Self {
        self.entries.push(Entry {
            path: String::new(),
            href: path.to_string(),
            media_type: "application/xhtml+xml".to_string(),
            body: Vec::new(),
            label: None,
        });
        self
    }

    fn entry(mut self, path: &str, href: &str, media_type: &str, body: Vec<u8>, label: Option<&str>) -> Self {
        self.entries.push(Entry {
            path: path.to_string(),
            href: href.to_string(),
            media_type: media_type.to_string(),
            body,
            label: label.map(str::to_string),
        });
        self
    }

    pub fn cover(mut self, path: &str, data: &[u8]) -> Self {
        self.cover = Some((path.to_string(), data.to_vec()));
        self
    }

    pub fn without_nav_document(mut self) -> Self {
        self.nav_document = false;
        self
    }

    pub fn without_ncx(mut self) -> Self {
        self.ncx = false;
        self
    }

    pub fn without_container(mut self) -> Self {
        self.container = false;
        self
    }

    /// Make NCX labels differ from nav document labels.
    pub fn with_ncx_label_suffix(mut self, suffix: &str) -> Self {
        self.ncx_label_suffix = suffix.to_string();
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let stored = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        let deflated = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        put(&mut zip, "mimetype", b"application/epub+zip", stored);
        if self.container {
            put(&mut zip, "META-INF/container.xml", CONTAINER_XML.as_bytes(), deflated);
        }
        put(&mut zip, "OEBPS/content.opf", self.opf().as_bytes(), deflated);
        if self.nav_document {
            put(&mut zip, "OEBPS/nav/toc.xhtml", self.nav().as_bytes(), deflated);
        }
        if self.ncx {
            put(&mut zip, "OEBPS/toc.ncx", self.ncx().as_bytes(), deflated);
        }
        for entry in &self.entries {
            if !entry.path.is_empty() {
                put(&mut zip, &format!("OEBPS/{}", entry.path), &entry.body, deflated);
            }
        }
        if let Some((path, data)) = &self.cover {
            put(&mut zip, &format!("OEBPS/{path}"), data, deflated);
        }

        zip.finish().expect("finish zip").into_inner()
    }

    fn opf(&self) -> String {
        let mut opf = String::from(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0" unique-identifier="BookId">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
"#,
        );
        if !self.title.is_empty() {
            opf.push_str(&format!("    <dc:title>{}</dc:title>\n", escape_xml(&self.title)));
        }
        for author in &self.authors {
            opf.push_str(&format!("    <dc:creator>{}</dc:creator>\n", escape_xml(author)));
        }
        opf.push_str("    <dc:language>en</dc:language>\n");
        opf.push_str("    <dc:identifier id=\"BookId\">urn:uuid:test</dc:identifier>\n");
        opf.push_str("  </metadata>\n  <manifest>\n");

        if self.nav_document {
            opf.push_str(r#"    <item id="nav" href="nav/toc.xhtml" media-type="application/xhtml+xml" properties="nav"/>"#);
            opf.push('\n');
        }
        if self.ncx {
            opf.push_str(r#"    <item id="ncx" href="toc.ncx" media-type="application/x-dtbncx+xml"/>"#);
            opf.push('\n');
        }
        for (i, entry) in self.entries.iter().enumerate() {
            opf.push_str(&format!(
                "    <item id=\"item{}\" href=\"{}\" media-type=\"{}\"/>\n",
                i + 1,
                entry.href,
                entry.media_type
            ));
        }
        if let Some((path, _)) = &self.cover {
            opf.push_str(&format!(
                "    <item id=\"cover-image\" href=\"{path}\" media-type=\"image/png\" properties=\"cover-image\"/>\n"
            ));
        }

        opf.push_str("  </manifest>\n");
        if self.ncx {
            opf.push_str("  <spine toc=\"ncx\">\n");
        } else {
            opf.push_str("  <spine>\n");
        }
        for i in 0..self.entries.len() {
            opf.push_str(&format!("    <itemref idref=\"item{}\"/>\n", i + 1));
        }
        opf.push_str("  </spine>\n</package>\n");
        opf
    }

    fn nav(&self) -> String {
        let mut items = String::new();
        for entry in &self.entries {
            if let Some(label) = &entry.label {
                items.push_str(&format!(
                    "      <li><a href=\"../{}\">{}</a></li>\n",
                    entry.href,
                    escape_xml(label)
                ));
            }
        }
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops">
<head><title>Contents</title></head>
<body>
  <nav epub:type="toc">
    <ol>
{items}    </ol>
  </nav>
</body>
</html>
"#
        )
    }

    fn ncx(&self) -> String {
        let mut points = String::new();
        let mut order = 0;
        for entry in &self.entries {
            if let Some(label) = &entry.label {
                order += 1;
                points.push_str(&format!(
                    "    <navPoint id=\"np{order}\" playOrder=\"{order}\">\n      <navLabel><text>{}{}</text></navLabel>\n      <content src=\"{}\"/>\n    </navPoint>\n",
                    escape_xml(label),
                    escape_xml(&self.ncx_label_suffix),
                    entry.href
                ));
            }
        }
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <head><meta name="dtb:uid" content="urn:uuid:test"/></head>
  <docTitle><text>{}</text></docTitle>
  <navMap>
{points}  </navMap>
</ncx>
"#,
            escape_xml(&self.title)
        )
    }
}

fn put(zip: &mut ZipWriter<Cursor<Vec<u8>>>, name: &str, data: &[u8], options: SimpleFileOptions) {
    zip.start_file(name, options).expect("start file");
    zip.write_all(data).expect("write file");
}

/// Wrap `body` in an XHTML content document.
pub fn xhtml(title: &str, body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml">
<head><title>{}</title></head>
<body>
{body}
</body>
</html>
"#,
        escape_xml(title)
    )
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const CONTAINER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;
