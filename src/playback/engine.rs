use std::time::Duration;

use super::timer::TickTimer;
use super::timing::{reading_time, tick_interval};
use super::{PlaybackEvent, PlaybackState};
use crate::book::{Chapter, Position, Progress};
use crate::config::{DEFAULT_WPM, WPM_STEP, clamp_wpm};
use crate::progress::{progress_at, restore_position};

type Listener = Box<dyn FnMut(&PlaybackEvent)>;

/// Word-by-word playback over a book's chapters.
///
/// The engine owns the reading position, the play state and the speed.
/// Time is supplied by the caller: [`play`](Self::play),
/// [`set_speed`](Self::set_speed) and [`advance`](Self::advance) take the
/// current clock reading, and nothing happens between calls. A UI loop calls
/// `advance(now)` every frame (or sleeps until [`next_deadline`](Self::next_deadline)).
pub struct PlaybackEngine {
    chapters: Vec<Chapter>,
    chapter_index: usize,
    current_index: usize,
    wpm: u32,
    state: PlaybackState,
    timer: TickTimer,
    /// When the next chapter becomes active after an automatic advance.
    pending_transition: Option<Duration>,
    chapter_settle: Duration,
    /// Latest clock reading seen.
    clock: Duration,
    listeners: Vec<Listener>,
}

impl PlaybackEngine {
    pub fn new(chapters: Vec<Chapter>) -> Self {
        Self {
            chapters,
            chapter_index: 0,
            current_index: 0,
            wpm: DEFAULT_WPM,
            state: PlaybackState::Paused,
            timer: TickTimer::default(),
            pending_transition: None,
            chapter_settle: Duration::from_secs(1),
            clock: Duration::ZERO,
            listeners: Vec::new(),
        }
    }

    pub fn with_wpm(mut self, wpm: u32) -> Self {
        self.wpm = clamp_wpm(wpm);
        self
    }

    /// Delay between the end of one chapter and the start of the next.
    pub fn with_chapter_settle(mut self, settle: Duration) -> Self {
        self.chapter_settle = settle;
        self
    }

    /// Start at `position`, clamped to the chapter table.
    pub fn starting_at(mut self, position: Position) -> Self {
        let position = restore_position(
            &Progress {
                position,
                percentage: 0.0,
            },
            &self.chapters,
        );
        self.chapter_index = position.chapter_index;
        self.current_index = position.word_index;
        self
    }

    /// Register a listener for every engine event.
    pub fn subscribe(&mut self, listener: impl FnMut(&PlaybackEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Register a listener for position changes only.
    pub fn on_position_change(&mut self, mut listener: impl FnMut(Position) + 'static) {
        self.subscribe(move |event| {
            if let PlaybackEvent::PositionChanged(position) = event {
                listener(*position);
            }
        });
    }

    fn emit(&mut self, event: PlaybackEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn wpm(&self) -> u32 {
        self.wpm
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    pub fn chapter_index(&self) -> usize {
        self.chapter_index
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn position(&self) -> Position {
        Position::new(self.chapter_index, self.current_index)
    }

    pub fn current_chapter(&self) -> Option<&Chapter> {
        self.chapters.get(self.chapter_index)
    }

    pub fn current_word(&self) -> Option<&str> {
        self.current_chapter()?
            .words
            .get(self.current_index)
            .map(String::as_str)
    }

    /// Words in the active chapter.
    pub fn word_count(&self) -> usize {
        self.current_chapter().map_or(0, Chapter::word_count)
    }

    /// Whole-book progress at the current position.
    pub fn progress(&self) -> Progress {
        progress_at(self.position(), &self.chapters)
    }

    /// True while waiting out the pause between two chapters.
    pub fn in_chapter_transition(&self) -> bool {
        self.pending_transition.is_some()
    }

    /// Reading time of the words before the current one in this chapter.
    pub fn chapter_elapsed(&self) -> Duration {
        reading_time(self.current_index, self.wpm)
    }

    /// Reading time of the whole active chapter.
    pub fn chapter_total(&self) -> Duration {
        reading_time(self.word_count(), self.wpm)
    }

    pub fn chapter_remaining(&self) -> Duration {
        self.chapter_total().saturating_sub(self.chapter_elapsed())
    }

    /// When `advance` next has work to do, if anything is scheduled.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending_transition.or_else(|| self.timer.next_due())
    }

    fn observe(&mut self, now: Duration) {
        self.clock = self.clock.max(now);
    }

    fn set_state(&mut self, state: PlaybackState) {
        if self.state != state {
            self.state = state;
            self.emit(PlaybackEvent::StateChanged(state));
        }
    }

    fn set_index(&mut self, index: usize) {
        if self.current_index != index {
            self.current_index = index;
            self.emit(PlaybackEvent::PositionChanged(self.position()));
        }
    }

    /// Start playing. Does nothing when the active chapter has no words or
    /// playback is already running.
    pub fn play(&mut self, now: Duration) {
        self.observe(now);
        if self.is_playing() || self.word_count() == 0 {
            return;
        }
        self.timer.arm(now, tick_interval(self.wpm));
        self.set_state(PlaybackState::Playing);
        log::debug!("play at {:?}, {} wpm", self.position(), self.wpm);
    }

    /// Stop playing. Cancels the tick timer and any pending chapter change.
    pub fn pause(&mut self) {
        self.timer.cancel();
        self.pending_transition = None;
        self.set_state(PlaybackState::Paused);
    }

    pub fn toggle(&mut self, now: Duration) {
        if self.is_playing() {
            self.pause();
        } else {
            self.play(now);
        }
    }

    /// Process everything due at or before `now`, in order. Returns the number
    /// of ticks consumed.
    pub fn advance(&mut self, now: Duration) -> usize {
        self.observe(now);
        let mut ticks = 0;

        loop {
            if let Some(deadline) = self.pending_transition {
                if deadline > now {
                    break;
                }
                self.pending_transition = None;
                self.enter_chapter(self.chapter_index + 1, true);
                self.timer.arm(deadline, tick_interval(self.wpm));
                continue;
            }

            let Some(due) = self.timer.fire(now) else {
                break;
            };
            ticks += 1;
            self.on_tick(due);
        }

        ticks
    }

    fn on_tick(&mut self, at: Duration) {
        log::trace!("tick at {at:?}, word {}", self.current_index);
        if self.current_index + 1 < self.word_count() {
            self.set_index(self.current_index + 1);
        } else if self.chapter_index + 1 < self.chapters.len() {
            self.timer.cancel();
            self.pending_transition = Some(at + self.chapter_settle);
            log::debug!(
                "end of chapter {}, next in {:?}",
                self.chapter_index,
                self.chapter_settle
            );
        } else {
            self.timer.cancel();
            self.set_state(PlaybackState::Paused);
            log::debug!("end of book");
            self.emit(PlaybackEvent::Finished);
        }
    }

    fn enter_chapter(&mut self, index: usize, auto: bool) {
        self.chapter_index = index;
        self.current_index = 0;
        self.emit(PlaybackEvent::ChapterChanged { index, auto });
        self.emit(PlaybackEvent::PositionChanged(self.position()));
    }

    /// Jump to word `index` of the active chapter, clamped into range.
    /// The play state is unchanged.
    pub fn seek(&mut self, index: isize) {
        let last = self.word_count().saturating_sub(1);
        let target = index.clamp(0, last as isize) as usize;

        if self.pending_transition.take().is_some() && self.is_playing() {
            // Seeking away from the chapter end resumes ticking here.
            self.timer.arm(self.clock, tick_interval(self.wpm));
        }
        self.set_index(target);
    }

    /// Move `delta` words forward (or back, when negative).
    pub fn seek_by(&mut self, delta: isize) {
        self.seek(self.current_index as isize + delta);
    }

    /// Change speed, clamped to the supported range. While playing the timer
    /// is re-armed at `now` with the new interval.
    pub fn set_speed(&mut self, wpm: u32, now: Duration) {
        self.observe(now);
        let wpm = clamp_wpm(wpm);
        if wpm == self.wpm {
            return;
        }
        self.wpm = wpm;
        if self.timer.is_armed() {
            self.timer.arm(now, tick_interval(wpm));
        }
        self.emit(PlaybackEvent::SpeedChanged(wpm));
    }

    pub fn faster(&mut self, now: Duration) {
        self.set_speed(self.wpm.saturating_add(WPM_STEP), now);
    }

    pub fn slower(&mut self, now: Duration) {
        self.set_speed(self.wpm.saturating_sub(WPM_STEP), now);
    }

    /// Go to chapter `index`, paused at its first word. Returns false (and
    /// does nothing) when `index` is out of range.
    pub fn go_to_chapter(&mut self, index: usize) -> bool {
        if index >= self.chapters.len() {
            return false;
        }
        self.pause();
        self.enter_chapter(index, false);
        true
    }

    pub fn next_chapter(&mut self) -> bool {
        self.go_to_chapter(self.chapter_index + 1)
    }

    pub fn prev_chapter(&mut self) -> bool {
        match self.chapter_index.checked_sub(1) {
            Some(index) => self.go_to_chapter(index),
            None => false,
        }
    }
}
