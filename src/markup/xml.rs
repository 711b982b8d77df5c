//! Strict XHTML parsing with quick-xml into the same arena tree.
//!
//! Self-closing tags such as `<title/>` or `<script src="a.js"/>` are only
//! meaningful in XML; the HTML tree builder treats them as open raw-text
//! elements that swallow the rest of the document.

use html5ever::{LocalName, Prefix, QualName, ns};
use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};

use super::arena::{Attribute, MarkupTree, NodeId};
use crate::util::resolve_entity;

/// Parse well-formed XHTML.
///
/// Fails on any well-formedness error: mismatched or unclosed tags,
/// malformed attributes, or an entity that is neither predefined, numeric
/// nor one of the common HTML names.
pub fn parse_xhtml(xml: &str) -> Result<MarkupTree, String> {
    let mut reader = Reader::from_str(xml);
    let mut tree = MarkupTree::new();
    let mut stack = vec![tree.document()];

    loop {
        let parent = stack.last().copied().unwrap_or_else(|| tree.document());
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let id = element(&mut tree, &e)?;
                tree.append(parent, id);
                stack.push(id);
            }
            Ok(Event::Empty(e)) => {
                let id = element(&mut tree, &e)?;
                tree.append(parent, id);
            }
            Ok(Event::End(_)) => {
                if stack.len() <= 1 {
                    return Err("end tag without an open element".to_string());
                }
                stack.pop();
            }
            Ok(Event::Text(e)) => tree.append_text(parent, &String::from_utf8_lossy(e.as_ref())),
            Ok(Event::CData(e)) => tree.append_text(parent, &String::from_utf8_lossy(e.as_ref())),
            Ok(Event::GeneralRef(e)) => {
                let name = String::from_utf8_lossy(e.as_ref());
                let resolved = resolve_entity(&name)
                    .or_else(|| html_entity(&name).map(str::to_string))
                    .ok_or_else(|| format!("unknown entity &{name};"))?;
                tree.append_text(parent, &resolved);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(format!("{e} at byte {}", reader.error_position())),
            _ => {}
        }
    }

    if stack.len() > 1 {
        return Err(format!("{} unclosed element(s)", stack.len() - 1));
    }
    Ok(tree)
}

fn element(tree: &mut MarkupTree, e: &BytesStart<'_>) -> Result<NodeId, String> {
    let name = e.name();
    let (_, local) = split_name(&String::from_utf8_lossy(name.as_ref()));
    let qname = QualName::new(None, ns!(html), LocalName::from(local.as_str()));

    let mut attrs = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        let (prefix, local) = split_name(&String::from_utf8_lossy(attr.key.as_ref()));
        attrs.push(Attribute {
            name: QualName::new(prefix.map(|p| Prefix::from(p.as_str())), ns!(), LocalName::from(local.as_str())),
            value: attribute_value(&attr.value),
        });
    }
    Ok(tree.create_element(qname, attrs))
}

/// Attribute text with predefined and numeric references resolved. Anything
/// else is kept as written.
fn attribute_value(raw: &[u8]) -> String {
    let raw = String::from_utf8_lossy(raw);
    match unescape(&raw) {
        Ok(value) => value.into_owned(),
        Err(_) => raw.into_owned(),
    }
}

/// `epub:type` -> (`Some("epub")`, `"type"`).
fn split_name(name: &str) -> (Option<String>, String) {
    match name.split_once(':') {
        Some((prefix, local)) => (Some(prefix.to_string()), local.to_string()),
        None => (None, name.to_string()),
    }
}

/// HTML named entities that show up in EPUB content declared with the XHTML
/// doctype.
fn html_entity(name: &str) -> Option<&'static str> {
    Some(match name {
        "nbsp" => "\u{a0}",
        "shy" => "\u{ad}",
        "ensp" => "\u{2002}",
        "emsp" => "\u{2003}",
        "thinsp" => "\u{2009}",
        "ndash" => "\u{2013}",
        "mdash" => "\u{2014}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "ldquo" => "\u{201c}",
        "rdquo" => "\u{201d}",
        "hellip" => "\u{2026}",
        "copy" => "\u{a9}",
        "eacute" => "\u{e9}",
        _ => return None,
    })
}
