//! Timed word-by-word playback.
//!
//! ```
//! use std::time::Duration;
//! use lector::book::{Chapter, Position};
//! use lector::playback::PlaybackEngine;
//!
//! let words: Vec<String> = "one two three four".split(' ').map(String::from).collect();
//! let chapter = Chapter {
//!     id: "ch1.xhtml".into(),
//!     title: "One".into(),
//!     href: "ch1.xhtml".into(),
//!     content: words.join(" "),
//!     words,
//! };
//!
//! let mut engine = PlaybackEngine::new(vec![chapter]).with_wpm(600);
//! engine.play(Duration::ZERO);
//! engine.advance(Duration::from_millis(250));
//! assert_eq!(engine.position(), Position::new(0, 2));
//! ```

mod engine;
mod timer;
mod timing;

pub use engine::PlaybackEngine;
pub use timer::TickTimer;
pub use timing::{format_clock, reading_time, tick_interval};

use crate::book::Position;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PlaybackState {
    #[default]
    Paused,
    Playing,
}

/// Notifications delivered synchronously to engine listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEvent {
    PositionChanged(Position),
    StateChanged(PlaybackState),
    SpeedChanged(u32),
    /// A new chapter became active. `auto` is true when playback ran into
    /// it, false for explicit navigation.
    ChapterChanged { index: usize, auto: bool },
    /// Playback reached the last word of the last chapter.
    Finished,
}
