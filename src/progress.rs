//! Conversions between reading positions and whole-book progress.

use crate::book::{Chapter, Position, Progress};

/// Whole-book completion for `position`, in `[0, 100]`.
///
/// Words read is the word count of every chapter before the active one plus
/// the word index; the result is `read / total * 100`. That ratio never
/// reaches 100 on its own, so it is overridden at the final word: whenever
/// `read + 1 >= total` the result is exactly 100. The first word of the book
/// is 0 and a book with no words is at 0.
pub fn compute_percentage(position: Position, chapters: &[Chapter]) -> f64 {
    let total: usize = chapters.iter().map(Chapter::word_count).sum();
    if total == 0 {
        return 0.0;
    }

    let position = clamp_position(position, chapters);
    let before: usize = chapters[..position.chapter_index]
        .iter()
        .map(Chapter::word_count)
        .sum();
    let read = before + position.word_index;

    if read + 1 >= total {
        return 100.0;
    }
    (read as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
}

/// Clamp a stored position to the current chapter table.
///
/// Stored progress may come from an older extraction of the same book, so
/// both indices are pulled back into range rather than trusted.
pub fn restore_position(progress: &Progress, chapters: &[Chapter]) -> Position {
    clamp_position(progress.position, chapters)
}

/// Position plus its percentage, ready to persist.
pub fn progress_at(position: Position, chapters: &[Chapter]) -> Progress {
    Progress {
        position,
        percentage: compute_percentage(position, chapters),
    }
}

fn clamp_position(position: Position, chapters: &[Chapter]) -> Position {
    let Some(last_chapter) = chapters.len().checked_sub(1) else {
        return Position::default();
    };
    let chapter_index = position.chapter_index.min(last_chapter);
    let last_word = chapters[chapter_index].word_count().saturating_sub(1);
    Position::new(chapter_index, position.word_index.min(last_word))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn chapters(sizes: &[usize]) -> Vec<Chapter> {
        sizes
            .iter()
            .enumerate()
            .map(|(i, &n)| {
                let words: Vec<String> = (0..n).map(|w| format!("w{w}")).collect();
                Chapter {
                    id: format!("ch{i}.xhtml"),
                    title: format!("Chapter {}", i + 1),
                    href: format!("ch{i}.xhtml"),
                    content: words.join(" "),
                    words,
                }
            })
            .collect()
    }

    #[test]
    fn test_percentage_example() {
        let book = chapters(&[100, 50]);
        let pct = compute_percentage(Position::new(1, 25), &book);
        assert!((pct - 83.333).abs() < 0.01, "{pct}");
    }

    #[test]
    fn test_bounds() {
        let book = chapters(&[10, 10]);
        assert_eq!(compute_percentage(Position::new(0, 0), &book), 0.0);
        assert_eq!(compute_percentage(Position::new(1, 9), &book), 100.0);
        assert!(compute_percentage(Position::new(1, 8), &book) < 100.0);
    }

    #[test]
    fn test_final_word_overrides_ratio() {
        // 19 of 20 words read would be 95 by the ratio alone
        let book = chapters(&[10, 10]);
        assert_eq!(compute_percentage(Position::new(1, 9), &book), 100.0);
        assert_eq!(compute_percentage(Position::new(1, 8), &book), 90.0);
    }

    #[test]
    fn test_no_words() {
        assert_eq!(compute_percentage(Position::new(0, 0), &[]), 0.0);
        assert_eq!(compute_percentage(Position::new(3, 3), &chapters(&[0])), 0.0);
    }

    #[test]
    fn test_single_word_book_is_complete() {
        assert_eq!(compute_percentage(Position::new(0, 0), &chapters(&[1])), 100.0);
    }

    #[test]
    fn test_restore_clamps() {
        let book = chapters(&[5, 3]);
        let stored = |c, w| Progress {
            position: Position::new(c, w),
            percentage: 0.0,
        };
        assert_eq!(restore_position(&stored(1, 2), &book), Position::new(1, 2));
        assert_eq!(restore_position(&stored(7, 0), &book), Position::new(1, 0));
        assert_eq!(restore_position(&stored(0, 99), &book), Position::new(0, 4));
        assert_eq!(restore_position(&stored(4, 4), &[]), Position::new(0, 0));
    }

    #[test]
    fn test_progress_at() {
        let book = chapters(&[4]);
        let progress = progress_at(Position::new(0, 2), &book);
        assert_eq!(progress.position, Position::new(0, 2));
        assert_eq!(progress.percentage, 50.0);
    }

    proptest! {
        #[test]
        fn prop_monotonic_in_reading_order(
            sizes in prop::collection::vec(1usize..40, 1..6),
        ) {
            let book = chapters(&sizes);
            let mut last = -1.0;
            for (c, chapter) in book.iter().enumerate() {
                for w in 0..chapter.word_count() {
                    let pct = compute_percentage(Position::new(c, w), &book);
                    prop_assert!(pct >= last);
                    prop_assert!((0.0..=100.0).contains(&pct));
                    last = pct;
                }
            }
            prop_assert_eq!(last, 100.0);
        }

        #[test]
        fn prop_restore_always_in_range(
            sizes in prop::collection::vec(0usize..20, 0..5),
            chapter in 0usize..10,
            word in 0usize..50,
        ) {
            let book = chapters(&sizes);
            let stored = Progress { position: Position::new(chapter, word), percentage: 0.0 };
            let pos = restore_position(&stored, &book);
            if book.is_empty() {
                prop_assert_eq!(pos, Position::default());
            } else {
                prop_assert!(pos.chapter_index < book.len());
                let count = book[pos.chapter_index].word_count();
                prop_assert!(pos.word_index < count.max(1));
            }
        }
    }
}
