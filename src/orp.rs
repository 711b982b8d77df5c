//! Optimal Recognition Point (ORP) calculation.
//!
//! The ORP is the character the eye should fixate on when a word flashes by.
//! It sits slightly left of center, following the length bands used by the
//! `speedread` family of RSVP readers.

/// ORP character offset (0-based, in chars) for `word`.
///
/// Depends only on the character count. Always `< max(1, len)`.
pub fn orp(word: &str) -> usize {
    orp_for_len(word.chars().count())
}

/// ORP offset for a word of `len` characters.
pub const fn orp_for_len(len: usize) -> usize {
    match len {
        0..=1 => 0,
        2..=5 => 1,
        6..=9 => 2,
        10..=13 => 3,
        _ => 4,
    }
}

/// A word split around its ORP character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrpSplit<'a> {
    pub before: &'a str,
    pub focus: &'a str,
    pub after: &'a str,
}

/// Split `word` into the text before the ORP, the ORP character, and the rest.
///
/// Slicing is done on char boundaries. An empty word yields three empty parts.
pub fn split_word(word: &str) -> OrpSplit<'_> {
    let index = orp(word);
    let mut bounds = word.char_indices().map(|(i, _)| i).skip(index);

    let Some(start) = bounds.next() else {
        return OrpSplit {
            before: word,
            focus: "",
            after: "",
        };
    };
    let end = bounds.next().unwrap_or(word.len());

    OrpSplit {
        before: &word[..start],
        focus: &word[start..end],
        after: &word[end..],
    }
}

/// Render `word` so its ORP character lands on `column`.
///
/// The focus character is wrapped in brackets for plain-text terminals. Words
/// whose prefix is wider than `column` are not padded.
pub fn render_aligned(word: &str, column: usize) -> String {
    let split = split_word(word);
    let pad = column.saturating_sub(split.before.chars().count());
    format!(
        "{}{}[{}]{}",
        " ".repeat(pad),
        split.before,
        split.focus,
        split.after
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_length_bands() {
        assert_eq!(orp("a"), 0);
        assert_eq!(orp("hello"), 1);
        assert_eq!(orp("wonderful"), 2);
        assert_eq!(orp("abcdefghijklm"), 3);
        assert_eq!(orp("abcdefghijklmn"), 4);
        assert_eq!(orp(""), 0);
    }

    #[test]
    fn test_counts_chars_not_bytes() {
        // six chars, more than nine bytes
        assert_eq!(orp("éééééé"), 2);
    }

    #[test]
    fn test_split_word() {
        let split = split_word("reading");
        assert_eq!(split.before, "re");
        assert_eq!(split.focus, "a");
        assert_eq!(split.after, "ding");
    }

    #[test]
    fn test_split_degenerate_words() {
        let empty = split_word("");
        assert_eq!((empty.before, empty.focus, empty.after), ("", "", ""));

        let single = split_word("I");
        assert_eq!((single.before, single.focus, single.after), ("", "I", ""));
    }

    #[test]
    fn test_split_multibyte() {
        let split = split_word("naïve");
        assert_eq!(split.before, "n");
        assert_eq!(split.focus, "a");
        assert_eq!(split.after, "ïve");

        let split = split_word("über");
        assert_eq!(split.before, "ü");
        assert_eq!(split.focus, "b");
    }

    #[test]
    fn test_render_aligned() {
        assert_eq!(render_aligned("hello", 4), "   h[e]llo");
        assert_eq!(render_aligned("a", 2), "  [a]");
    }

    proptest! {
        #[test]
        fn prop_orp_within_word(word in "\\PC{0,40}") {
            let len = word.chars().count();
            prop_assert!(orp(&word) < len.max(1));
        }

        #[test]
        fn prop_split_reassembles(word in "\\PC{0,40}") {
            let split = split_word(&word);
            prop_assert_eq!(format!("{}{}{}", split.before, split.focus, split.after), word);
        }
    }
}
