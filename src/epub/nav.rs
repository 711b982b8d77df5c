//! EPUB 3 navigation document (`<nav epub:type="toc">`).

use crate::book::NavPoint;
use crate::markup::{MarkupTree, NodeId, XHTML_MEDIA_TYPE, extract_text, parse_content};

/// Parse the table of contents out of a navigation document.
///
/// The `toc` nav is preferred; a document with a single untyped `<nav>` is
/// accepted too. Hrefs are returned as written, relative to the nav document.
pub fn parse_nav_document(html: &str) -> Vec<NavPoint> {
    let tree = parse_content(html, XHTML_MEDIA_TYPE);
    let navs = tree.find_all_tags(&["nav"]);

    let toc = navs
        .iter()
        .copied()
        .find(|&id| {
            tree.get_attr(id, "epub:type")
                .is_some_and(|t| t.split_ascii_whitespace().any(|t| t == "toc"))
        })
        .or_else(|| match navs.as_slice() {
            [only] => Some(*only),
            _ => None,
        });

    let Some(toc) = toc else {
        return Vec::new();
    };

    tree.descendants(toc)
        .into_iter()
        .find(|&id| tree.is_tag(id, "ol") || tree.is_tag(id, "ul"))
        .map(|list| parse_list(&tree, list))
        .unwrap_or_default()
}

fn parse_list(tree: &MarkupTree, list: NodeId) -> Vec<NavPoint> {
    tree.children(list)
        .filter(|&child| tree.is_tag(child, "li"))
        .filter_map(|li| parse_item(tree, li))
        .collect()
}

fn parse_item(tree: &MarkupTree, li: NodeId) -> Option<NavPoint> {
    let mut label = None;
    let mut href = String::new();
    let mut children = Vec::new();

    for child in tree.children(li) {
        if tree.is_tag(child, "a") || tree.is_tag(child, "span") {
            if label.is_none() {
                label = Some(extract_text(tree, child));
                href = tree.get_attr(child, "href").unwrap_or_default().to_string();
            }
        } else if tree.is_tag(child, "ol") || tree.is_tag(child, "ul") {
            children = parse_list(tree, child);
        }
    }

    // Headings without a link only carry their children.
    let label = label?;
    Some(NavPoint {
        href,
        label,
        children,
    })
}
