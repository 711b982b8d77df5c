//! Continuous-text rendering support: paragraph grouping and word states.

/// Where a word sits relative to the reading position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WordState {
    Past,
    Active,
    Upcoming,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewWord<'a> {
    /// Index into the chapter's word list.
    pub index: usize,
    pub text: &'a str,
    pub state: WordState,
}

/// A chapter's words grouped into paragraphs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextView<'a> {
    paragraphs: Vec<Vec<ViewWord<'a>>>,
    current: usize,
}

/// Paragraph breaks are only taken in the first few words of every window of
/// this many, so paragraphs stay roughly even.
const BREAK_WINDOW: usize = 50;
const BREAK_SLACK: usize = 10;

impl<'a> TextView<'a> {
    pub fn new(words: &'a [String], current: usize) -> Self {
        let mut paragraphs = Vec::new();
        let mut paragraph = Vec::new();

        for (index, word) in words.iter().enumerate() {
            let state = match index.cmp(&current) {
                std::cmp::Ordering::Less => WordState::Past,
                std::cmp::Ordering::Equal => WordState::Active,
                std::cmp::Ordering::Greater => WordState::Upcoming,
            };
            paragraph.push(ViewWord {
                index,
                text: word,
                state,
            });

            if let Some(next) = words.get(index + 1)
                && is_paragraph_break(index, word, next)
            {
                paragraphs.push(std::mem::take(&mut paragraph));
            }
        }
        if !paragraph.is_empty() {
            paragraphs.push(paragraph);
        }

        Self { paragraphs, current }
    }

    pub fn paragraphs(&self) -> &[Vec<ViewWord<'a>>] {
        &self.paragraphs
    }

    /// Index of the paragraph holding the active word.
    pub fn active_paragraph(&self) -> Option<usize> {
        self.paragraphs
            .iter()
            .position(|p| p.iter().any(|w| w.index == self.current))
    }
}

fn is_paragraph_break(index: usize, word: &str, next: &str) -> bool {
    let ends_sentence = word.ends_with(['.', '!', '?']);
    let next_is_upper = next
        .chars()
        .next()
        .is_some_and(|c| c.to_uppercase().eq(std::iter::once(c)));
    ends_sentence && next_is_upper && (index + 1) % BREAK_WINDOW < BREAK_SLACK
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(text: &str) -> Vec<String> {
        text.split(' ').map(String::from).collect()
    }

    #[test]
    fn test_word_states() {
        let words = words("a b c");
        let view = TextView::new(&words, 1);
        let states: Vec<_> = view.paragraphs()[0].iter().map(|w| w.state).collect();
        assert_eq!(states, vec![WordState::Past, WordState::Active, WordState::Upcoming]);
    }

    #[test]
    fn test_breaks_after_sentence_in_window() {
        // index 2 ends a sentence, (2 + 1) % 50 < 10
        let words = words("It was dark. The end");
        let view = TextView::new(&words, 0);
        assert_eq!(view.paragraphs().len(), 2);
        assert_eq!(view.paragraphs()[1][0].text, "The");
        assert_eq!(view.paragraphs()[1][0].index, 3);
    }

    #[test]
    fn test_no_break_before_lowercase() {
        let words = words("Wait... what");
        assert_eq!(TextView::new(&words, 0).paragraphs().len(), 1);
    }

    #[test]
    fn test_no_break_outside_window() {
        let mut list: Vec<String> = (0..20).map(|i| format!("w{i}")).collect();
        list[14] = "stop.".into();
        list[15] = "Next".into();
        // (14 + 1) % 50 == 15, outside the window
        assert_eq!(TextView::new(&list, 0).paragraphs().len(), 1);
    }

    #[test]
    fn test_punctuation_only_next_word_counts_as_upper() {
        // '"' has no case, so it equals its own uppercase form
        let words = words("Done! \"Yes\"");
        assert_eq!(TextView::new(&words, 0).paragraphs().len(), 2);
    }

    #[test]
    fn test_active_paragraph() {
        let words = words("One. Two. Three");
        let view = TextView::new(&words, 2);
        assert_eq!(view.paragraphs().len(), 3);
        assert_eq!(view.active_paragraph(), Some(2));
        assert!(TextView::new(&[], 0).paragraphs().is_empty());
    }
}
