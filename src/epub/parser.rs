//! Package-level XML parsing: container.xml, the OPF package document and
//! the NCX table of contents.

use std::collections::HashMap;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::book::{Metadata, NavPoint};
use crate::util::{resolve_entity, strip_bom};

/// A manifest `<item>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestItem {
    pub href: String,
    pub media_type: String,
    pub properties: Vec<String>,
}

impl ManifestItem {
    pub fn has_property(&self, property: &str) -> bool {
        self.properties.iter().any(|p| p == property)
    }
}

/// Parsed OPF package data.
#[derive(Debug, Default)]
pub struct OpfData {
    pub metadata: Metadata,
    /// Manifest id -> item.
    pub manifest: HashMap<String, ManifestItem>,
    /// Spine idrefs, in reading order.
    pub spine_ids: Vec<String>,
    /// Href of the NCX, relative to the OPF.
    pub ncx_href: Option<String>,
    /// Href of the EPUB 3 navigation document, relative to the OPF.
    pub nav_href: Option<String>,
}

/// Parse `META-INF/container.xml` and return the OPF path.
pub fn parse_container_xml(bytes: &[u8]) -> Result<String, String> {
    let content = std::str::from_utf8(strip_bom(bytes)).map_err(|e| e.to_string())?;

    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(e)) | Ok(Event::Start(e)) if local_name(e.name().as_ref()) == b"rootfile" => {
                if let Some(path) = attr_value(&e, b"full-path") {
                    return Ok(path);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.to_string()),
            _ => {}
        }
    }

    Err("no rootfile in container.xml".into())
}

/// Parse the OPF package document.
///
/// Text is not trimmed per event: entity references split text events, and
/// trimming each piece would eat the spaces around them.
pub fn parse_opf(content: &str) -> Result<OpfData, String> {
    let mut reader = Reader::from_str(content);

    let mut data = OpfData::default();
    let mut toc_id: Option<String> = None;
    let mut epub2_cover_id: Option<String> = None;
    let mut saw_package = false;

    let mut in_metadata = false;
    let mut current_element: Option<&'static str> = None;
    let mut buf_text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"package" => saw_package = true,
                    b"metadata" => in_metadata = true,
                    b"title" if in_metadata => current_element = Some("title"),
                    b"creator" if in_metadata => current_element = Some("creator"),
                    b"language" if in_metadata => current_element = Some("language"),
                    b"identifier" if in_metadata => current_element = Some("identifier"),
                    b"spine" => toc_id = attr_value(&e, b"toc"),
                    _ => handle_empty_like(&e, &mut data, &mut epub2_cover_id),
                }
                if current_element.is_some() {
                    buf_text.clear();
                }
            }
            Ok(Event::Empty(e)) => {
                if local_name(e.name().as_ref()) == b"spine" {
                    toc_id = attr_value(&e, b"toc");
                } else {
                    handle_empty_like(&e, &mut data, &mut epub2_cover_id);
                }
            }
            Ok(Event::Text(e)) => {
                if current_element.is_some() {
                    buf_text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if current_element.is_some()
                    && let Some(resolved) = resolve_entity(&String::from_utf8_lossy(e.as_ref()))
                {
                    buf_text.push_str(&resolved);
                }
            }
            Ok(Event::End(e)) => {
                let name = e.name();
                let local = local_name(name.as_ref());
                if local == b"metadata" {
                    in_metadata = false;
                }

                if let Some(elem) = current_element.take() {
                    let text = buf_text.trim().to_string();
                    let metadata = &mut data.metadata;
                    match elem {
                        "title" if metadata.title.is_empty() => metadata.title = text,
                        "creator" if !text.is_empty() => metadata.authors.push(text),
                        "language" if metadata.language.is_empty() => metadata.language = text,
                        "identifier" if metadata.identifier.is_empty() => metadata.identifier = text,
                        _ => {}
                    }
                    buf_text.clear();
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.to_string()),
            _ => {}
        }
    }

    if !saw_package {
        return Err("no <package> element in package document".into());
    }

    // EPUB 3 cover-image property takes priority over the EPUB 2 meta.
    let epub3_cover = data
        .manifest
        .values()
        .find(|item| item.has_property("cover-image"));
    data.metadata.cover_image = match (epub3_cover, epub2_cover_id) {
        (Some(item), _) => Some(item.href.clone()),
        (None, Some(id)) => data.manifest.get(&id).map(|item| item.href.clone()),
        (None, None) => None,
    };

    data.nav_href = data
        .manifest
        .values()
        .find(|item| item.has_property("nav"))
        .map(|item| item.href.clone());

    data.ncx_href = toc_id
        .and_then(|id| data.manifest.get(&id))
        .or_else(|| {
            data.manifest
                .values()
                .find(|item| item.media_type == "application/x-dtbncx+xml")
        })
        .map(|item| item.href.clone());

    Ok(data)
}

/// Attribute-only elements of the OPF. Some packages write them with
/// explicit end tags, so they are accepted from both start and empty events.
fn handle_empty_like(e: &BytesStart<'_>, data: &mut OpfData, epub2_cover_id: &mut Option<String>) {
    let name = e.name();
    match local_name(name.as_ref()) {
        b"item" => {
            let Some(id) = attr_value(e, b"id").filter(|id| !id.is_empty()) else {
                return;
            };
            let item = ManifestItem {
                href: attr_value(e, b"href").unwrap_or_default(),
                media_type: attr_value(e, b"media-type").unwrap_or_default(),
                properties: attr_value(e, b"properties")
                    .map(|p| p.split_ascii_whitespace().map(str::to_string).collect())
                    .unwrap_or_default(),
            };
            data.manifest.insert(id, item);
        }
        b"itemref" => {
            if let Some(idref) = attr_value(e, b"idref") {
                data.spine_ids.push(idref);
            }
        }
        b"meta" => {
            if attr_value(e, b"name").as_deref() == Some("cover")
                && let Some(content) = attr_value(e, b"content").filter(|c| !c.is_empty())
            {
                *epub2_cover_id = Some(content);
            }
        }
        _ => {}
    }
}

/// Parse an NCX table of contents into a navigation tree.
///
/// Hrefs are returned as written, relative to the NCX file.
pub fn parse_ncx(content: &str) -> Result<Vec<NavPoint>, String> {
    let mut reader = Reader::from_str(content);

    struct NavPointState {
        children: Vec<NavPoint>,
        text: Option<String>,
        src: Option<String>,
    }

    impl NavPointState {
        fn new() -> Self {
            Self {
                children: Vec::new(),
                text: None,
                src: None,
            }
        }

        fn push_text(&mut self, text: &str) {
            match &mut self.text {
                Some(existing) => existing.push_str(text),
                None => self.text = Some(text.to_string()),
            }
        }
    }

    let mut stack: Vec<NavPointState> = vec![NavPointState::new()];
    let mut in_nav_map = false;
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"navMap" => in_nav_map = true,
                    b"navPoint" if in_nav_map => stack.push(NavPointState::new()),
                    b"text" => in_text = in_nav_map,
                    _ => {}
                }
            }
            Ok(Event::Empty(e)) => {
                let name = e.name();
                if in_nav_map
                    && local_name(name.as_ref()) == b"content"
                    && let Some(src) = attr_value(&e, b"src")
                    && let Some(state) = stack.last_mut()
                {
                    state.src = Some(src);
                }
            }
            Ok(Event::Text(e)) => {
                if in_text && let Some(state) = stack.last_mut() {
                    state.push_text(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if in_text
                    && let Some(state) = stack.last_mut()
                    && let Some(resolved) = resolve_entity(&String::from_utf8_lossy(e.as_ref()))
                {
                    state.push_text(&resolved);
                }
            }
            Ok(Event::End(e)) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"navMap" => in_nav_map = false,
                    b"text" => in_text = false,
                    b"navPoint" if stack.len() > 1 => {
                        if let Some(state) = stack.pop()
                            && let Some(src) = state.src
                            && let Some(parent) = stack.last_mut()
                        {
                            let label = state.text.unwrap_or_default().trim().to_string();
                            let mut point = NavPoint::new(label, src);
                            point.children = state.children;
                            parent.children.push(point);
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.to_string()),
            _ => {}
        }
    }

    Ok(stack.into_iter().next().map(|s| s.children).unwrap_or_default())
}

fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| local_name(attr.key.as_ref()) == key)
        .map(|attr| String::from_utf8_lossy(&attr.value).into_owned())
}

/// Local part of a namespaced XML name (`dc:title` -> `title`).
fn local_name(name: &[u8]) -> &[u8] {
    name.iter()
        .rposition(|&b| b == b':')
        .map(|i| &name[i + 1..])
        .unwrap_or(name)
}
