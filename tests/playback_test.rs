//! Playback over extracted books, with progress and the continuous text view.

mod common;

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use common::EpubBuilder;
use lector::progress::restore_position;
use lector::text_view::WordState;
use lector::{PlaybackEngine, PlaybackEvent, PlaybackState, Position, TextView, compute_percentage, open_book};

fn words(n: usize) -> String {
    let words: Vec<String> = (0..n).map(|i| format!("w{i}")).collect();
    format!("<p>{}</p>", words.join(" "))
}

fn two_chapter_book() -> lector::OpenedBook {
    let bytes = EpubBuilder::new("Timing")
        .chapter("Short", &words(5))
        .chapter("Long", &words(20))
        .build();
    open_book(bytes).unwrap()
}

#[test]
fn test_reads_through_whole_book() {
    let book = two_chapter_book();
    let mut engine = PlaybackEngine::new(book.chapters)
        .with_wpm(600)
        .with_chapter_settle(Duration::from_millis(500));

    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    engine.subscribe(move |event| sink.borrow_mut().push(event.clone()));

    engine.play(Duration::ZERO);
    // 100 ms per word; generous horizon
    let mut now = Duration::ZERO;
    while engine.is_playing() && now < Duration::from_secs(30) {
        now += Duration::from_millis(10);
        engine.advance(now);
    }

    assert_eq!(engine.state(), PlaybackState::Paused);
    assert_eq!(engine.position(), Position::new(1, 19));
    assert_eq!(engine.progress().percentage, 100.0);

    let events = events.borrow();
    assert!(events.contains(&PlaybackEvent::ChapterChanged { index: 1, auto: true }));
    assert_eq!(events.last(), Some(&PlaybackEvent::Finished));
}

#[test]
fn test_chapter_boundary_timing() {
    let book = two_chapter_book();
    let mut engine = PlaybackEngine::new(book.chapters)
        .with_wpm(600)
        .with_chapter_settle(Duration::from_secs(1));
    engine.play(Duration::ZERO);

    // words 1..4 at 100..400 ms, chapter end noticed at 500 ms
    engine.advance(Duration::from_millis(500));
    assert_eq!(engine.position(), Position::new(0, 4));
    assert!(engine.in_chapter_transition());

    engine.advance(Duration::from_millis(1499));
    assert_eq!(engine.chapter_index(), 0);
    engine.advance(Duration::from_millis(1500));
    assert_eq!(engine.position(), Position::new(1, 0));
    engine.advance(Duration::from_millis(1600));
    assert_eq!(engine.position(), Position::new(1, 1));
}

#[test]
fn test_seek_during_transition_resumes_in_chapter() {
    let book = two_chapter_book();
    let mut engine = PlaybackEngine::new(book.chapters).with_wpm(600);
    engine.play(Duration::ZERO);
    engine.advance(Duration::from_millis(500));
    assert!(engine.in_chapter_transition());

    engine.seek(1);
    assert!(!engine.in_chapter_transition());
    assert!(engine.is_playing());
    engine.advance(Duration::from_millis(600));
    assert_eq!(engine.position(), Position::new(0, 2));
}

#[test]
fn test_progress_matches_position() {
    let book = two_chapter_book();
    let chapters = book.chapters.clone();
    let mut engine = PlaybackEngine::new(book.chapters);

    assert_eq!(engine.progress().percentage, 0.0);
    engine.go_to_chapter(1);
    engine.seek(10);

    let progress = engine.progress();
    assert_eq!(progress.position, Position::new(1, 10));
    // 5 + 10 words read of 25
    let expected = 15.0 / 25.0 * 100.0;
    assert!((progress.percentage - expected).abs() < 1e-9);
    assert_eq!(compute_percentage(progress.position, &chapters), progress.percentage);
    assert_eq!(restore_position(&progress, &chapters), progress.position);
}

#[test]
fn test_resume_from_saved_position() {
    let book = two_chapter_book();
    let engine = PlaybackEngine::new(book.chapters).starting_at(Position::new(1, 7));
    assert_eq!(engine.current_word(), Some("w7"));
    assert_eq!(engine.chapter_index(), 1);
}

#[test]
fn test_text_view_tracks_engine() {
    let text = "The end. Then a new start follows here. More text.";
    let bytes = EpubBuilder::new("View").chapter("One", &format!("<p>{text}</p>")).build();
    let book = open_book(bytes).unwrap();
    let mut engine = PlaybackEngine::new(book.chapters);
    engine.seek(3);

    let chapter = engine.current_chapter().unwrap();
    let view = TextView::new(&chapter.words, engine.current_index());

    let flat: Vec<_> = view.paragraphs().iter().flatten().collect();
    assert_eq!(flat.len(), chapter.word_count());
    assert_eq!(flat[3].text, "a");
    assert_eq!(flat[3].state, WordState::Active);
    assert!(flat[..3].iter().all(|w| w.state == WordState::Past));
    assert!(flat[4..].iter().all(|w| w.state == WordState::Upcoming));
    // "end." followed by a capital starts a new paragraph
    assert_eq!(view.paragraphs()[0].len(), 2);
    assert_eq!(view.active_paragraph(), Some(1));
}
