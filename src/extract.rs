//! Chapter extraction: content units in, readable chapters out.
//!
//! Every unit is rendered, stripped of non-content markup, flattened to text
//! and tokenized. Units that fail or produce no words are skipped; only a
//! document that cannot be opened at all is an error, and that happens before
//! extraction starts.

use crate::book::{Chapter, NavPoint};
use crate::document::{ContentUnit, Document};
use crate::error::UnitError;
use crate::markup::{parse_content, readable_text};
use crate::tokenize::tokenize;

/// Why a unit produced no chapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The unit could not be rendered.
    Failed(UnitError),
    /// The unit rendered but contained no words.
    Empty,
}

/// What happened to each unit during extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionReport {
    pub emitted: usize,
    /// Skipped unit references, in document order.
    pub skipped: Vec<(String, SkipReason)>,
}

/// Extract readable chapters in reading order.
pub fn extract_chapters<D: Document + ?Sized>(doc: &mut D) -> Vec<Chapter> {
    extract_chapters_with_report(doc).0
}

/// [`extract_chapters`], plus a record of the units that were skipped.
pub fn extract_chapters_with_report<D: Document + ?Sized>(doc: &mut D) -> (Vec<Chapter>, ExtractionReport) {
    let navigation = doc.navigation().to_vec();
    let toc = flatten_navigation(&navigation);
    let units: Vec<ContentUnit> = doc.content_units().to_vec();

    let mut chapters = Vec::new();
    let mut report = ExtractionReport::default();

    for unit in units {
        let html = match doc.render(&unit) {
            Ok(html) => html,
            Err(e) => {
                log::debug!("skipping {}: {e}", unit.reference);
                report.skipped.push((unit.reference, SkipReason::Failed(e)));
                continue;
            }
        };

        let content = readable_text(parse_content(&html, &unit.media_type));
        let words = tokenize(&content);
        if words.is_empty() {
            log::debug!("skipping {}: no readable text", unit.reference);
            report.skipped.push((unit.reference, SkipReason::Empty));
            continue;
        }

        let title = find_title(&toc, &unit.reference)
            .unwrap_or_else(|| format!("Section {}", chapters.len() + 1));

        chapters.push(Chapter {
            id: unit.reference.clone(),
            title,
            href: unit.reference,
            content,
            words,
        });
    }

    report.emitted = chapters.len();
    log::debug!(
        "extracted {} chapters, skipped {} units",
        report.emitted,
        report.skipped.len()
    );
    (chapters, report)
}

/// Pre-order flattening: every parent precedes its children.
pub fn flatten_navigation(points: &[NavPoint]) -> Vec<&NavPoint> {
    let mut out = Vec::new();
    for point in points {
        out.push(point);
        out.extend(flatten_navigation(&point.children));
    }
    out
}

/// Label of the first navigation entry matching `reference`.
///
/// Matching ignores the entry's fragment and accepts containment or a shared
/// suffix in either direction, so `ch1.xhtml` matches `text/ch1.xhtml`.
/// Entries without an href never match. A blank label counts as no match.
pub fn find_title(toc: &[&NavPoint], reference: &str) -> Option<String> {
    toc.iter()
        .find(|point| {
            let href = point.href.split('#').next().unwrap_or_default();
            !href.is_empty()
                && (reference.contains(href)
                    || href.contains(reference)
                    || reference.ends_with(href)
                    || href.ends_with(reference))
        })
        .map(|point| point.label.trim())
        .filter(|label| !label.is_empty())
        .map(str::to_string)
}
