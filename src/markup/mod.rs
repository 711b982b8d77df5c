//! Markup parsing and readable-text extraction.
//!
//! XHTML content documents are built with quick-xml, so self-closing tags
//! like `<title/>` close where XML says they do. Anything that is not
//! well-formed XML, and plain HTML, goes through html5ever, which always
//! produces a tree.
//!
//! # Example
//!
//! ```
//! use lector::markup::{parse_markup, readable_text};
//!
//! let tree = parse_markup("<body><nav>Contents</nav><p>Call me</p><p>Ishmael.</p></body>");
//! assert_eq!(readable_text(tree), "Call me Ishmael.");
//! ```

mod arena;
mod tree_sink;
mod xml;

pub use arena::{Attribute, Children, MarkupTree, Node, NodeData, NodeId};
pub use tree_sink::TreeBuilder;
pub use xml::parse_xhtml;

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;

use crate::tokenize::normalize_whitespace;

/// Elements whose subtrees never contribute readable text.
pub const NON_CONTENT_TAGS: &[&str] = &["script", "style", "nav", "header", "footer"];

/// Elements that separate words at their boundaries.
const BLOCK_TAGS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "br",
    "dd",
    "div",
    "dl",
    "dt",
    "figcaption",
    "figure",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "hr",
    "li",
    "main",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "td",
    "th",
    "tr",
    "ul",
];

/// Media type of XHTML content documents.
pub const XHTML_MEDIA_TYPE: &str = "application/xhtml+xml";

/// Parse a content document according to its media type.
///
/// XHTML (declared as such, or starting with an XML declaration) is parsed
/// as XML first; html5ever is the fallback when that fails.
pub fn parse_content(markup: &str, media_type: &str) -> MarkupTree {
    if media_type == XHTML_MEDIA_TYPE || has_xml_declaration(markup) {
        match parse_xhtml(markup) {
            Ok(tree) => return tree,
            Err(e) => log::debug!("not well-formed XHTML ({e}), parsing as HTML"),
        }
    }
    parse_markup(markup)
}

fn has_xml_declaration(markup: &str) -> bool {
    markup.trim_start_matches('\u{feff}').trim_start().starts_with("<?xml")
}

/// Parse a markup string into a tree with the HTML parser.
pub fn parse_markup(html: &str) -> MarkupTree {
    parse_document(TreeBuilder::new(), ParseOpts::default())
        .from_utf8()
        .one(html.as_bytes())
        .into_tree()
}

/// Parse markup bytes, honouring an XML encoding declaration.
pub fn parse_markup_bytes(bytes: &[u8]) -> MarkupTree {
    parse_content(&crate::util::decode_document(bytes), "")
}

/// Detach every non-content subtree. Returns how many were removed.
pub fn strip_non_content(tree: &mut MarkupTree) -> usize {
    let doomed = tree.find_all_tags(NON_CONTENT_TAGS);
    let mut removed = 0;
    for id in doomed {
        // Nested matches are already unreachable once an ancestor is gone.
        if is_attached(tree, id) {
            tree.detach(id);
            removed += 1;
        }
    }
    removed
}

fn is_attached(tree: &MarkupTree, id: NodeId) -> bool {
    let document = tree.document();
    let mut current = id;
    while let Some(node) = tree.get(current) {
        if current == document {
            return true;
        }
        current = node.parent;
    }
    false
}

/// Concatenated text under `root`, whitespace-normalized.
///
/// Block-level elements and `<br>` contribute a space at their boundaries.
pub fn extract_text(tree: &MarkupTree, root: NodeId) -> String {
    let mut raw = String::new();
    collect_text(tree, root, &mut raw);
    normalize_whitespace(&raw)
}

fn collect_text(tree: &MarkupTree, id: NodeId, out: &mut String) {
    let Some(node) = tree.get(id) else {
        return;
    };
    match &node.data {
        NodeData::Text(text) => out.push_str(text),
        NodeData::Element { name, .. } => {
            let block = BLOCK_TAGS.contains(&&*name.local);
            if block {
                out.push(' ');
            }
            for child in tree.children(id) {
                collect_text(tree, child, out);
            }
            if block {
                out.push(' ');
            }
        }
        NodeData::Document => {
            for child in tree.children(id) {
                collect_text(tree, child, out);
            }
        }
        NodeData::Other => {}
    }
}

/// Readable text of a whole document: non-content removed, text taken from
/// `body`, or from the document root when there is none.
pub fn readable_text(mut tree: MarkupTree) -> String {
    strip_non_content(&mut tree);
    let root = tree.find_by_tag("body").unwrap_or_else(|| tree.document());
    extract_text(&tree, root)
}
