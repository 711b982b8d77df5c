//! Whitespace normalization and word splitting.
//!
//! Words keep their surface form: punctuation and case are untouched because
//! trailing punctuation drives paragraph breaks and ORP rendering downstream.

/// Collapse every run of whitespace to a single space and trim both ends.
pub fn normalize_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Split text into display words.
///
/// Input is normalized first, so runs of mixed whitespace never produce
/// empty words. Empty input yields an empty vector.
pub fn tokenize(text: &str) -> Vec<String> {
    normalize_whitespace(text)
        .split(' ')
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .collect()
}
