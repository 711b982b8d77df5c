//! A reading session: playback plus periodic progress saves.

use std::time::Duration;

use crate::book::Progress;
use crate::config::ReaderConfig;
use crate::library::OpenedBook;
use crate::playback::PlaybackEngine;
use crate::store::BookStore;

/// Couples a [`PlaybackEngine`] to the store for one open book.
///
/// Saves are fire-and-forget: a failed write is logged and the next save
/// tries again with the then-current position.
pub struct ReadingSession<'s> {
    book_id: String,
    engine: PlaybackEngine,
    store: &'s dyn BookStore,
    autosave_interval: Duration,
    last_save_at: Duration,
    last_saved: Option<Progress>,
}

impl<'s> ReadingSession<'s> {
    pub fn new(store: &'s dyn BookStore, book_id: impl Into<String>, book: OpenedBook, config: &ReaderConfig) -> Self {
        let engine = PlaybackEngine::new(book.chapters)
            .with_wpm(config.initial_wpm())
            .with_chapter_settle(config.chapter_settle())
            .starting_at(book.initial_position);
        Self {
            book_id: book_id.into(),
            engine,
            store,
            autosave_interval: config.autosave_interval(),
            last_save_at: Duration::ZERO,
            last_saved: None,
        }
    }

    pub fn book_id(&self) -> &str {
        &self.book_id
    }

    pub fn engine(&self) -> &PlaybackEngine {
        &self.engine
    }

    /// Direct engine access for play, pause, seek and speed controls.
    pub fn engine_mut(&mut self) -> &mut PlaybackEngine {
        &mut self.engine
    }

    /// Advance playback to `now` and save progress when the autosave interval
    /// has elapsed. Returns the number of words advanced.
    pub fn tick(&mut self, now: Duration) -> usize {
        let ticks = self.engine.advance(now);
        if now.saturating_sub(self.last_save_at) >= self.autosave_interval {
            self.last_save_at = now;
            self.save();
        }
        ticks
    }

    /// Write the current progress now. Failures are logged, not returned.
    /// Returns whether the write succeeded.
    pub fn save(&mut self) -> bool {
        let progress = self.engine.progress();
        if self.last_saved == Some(progress) {
            return true;
        }
        match self.store.save_progress(&self.book_id, progress) {
            Ok(()) => {
                log::trace!("saved progress {:.1}% for {}", progress.percentage, self.book_id);
                self.last_saved = Some(progress);
                true
            }
            Err(e) => {
                log::warn!("failed to save progress for {}: {e}", self.book_id);
                false
            }
        }
    }

    pub fn next_chapter(&mut self) -> bool {
        let moved = self.engine.next_chapter();
        if moved {
            self.save();
        }
        moved
    }

    pub fn prev_chapter(&mut self) -> bool {
        let moved = self.engine.prev_chapter();
        if moved {
            self.save();
        }
        moved
    }

    pub fn go_to_chapter(&mut self, index: usize) -> bool {
        let moved = self.engine.go_to_chapter(index);
        if moved {
            self.save();
        }
        moved
    }

    /// Stop playback and write a final save.
    pub fn finish(mut self) -> bool {
        self.engine.pause();
        self.save()
    }
}
