//! The engine's single tick timer.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Armed {
    interval: Duration,
    next_due: Duration,
}

/// A repeating timer over an external clock.
///
/// There is exactly one timer per engine and it is either armed or not:
/// arming replaces any previous schedule, so two tick sources can never run
/// at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickTimer {
    armed: Option<Armed>,
}

impl TickTimer {
    /// Schedule ticks every `interval`, the first one at `now + interval`.
    pub fn arm(&mut self, now: Duration, interval: Duration) {
        self.armed = Some(Armed {
            interval,
            next_due: now + interval,
        });
    }

    /// Stop ticking. Cancelling an idle timer does nothing.
    pub fn cancel(&mut self) {
        self.armed = None;
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.armed.map(|armed| armed.next_due)
    }

    /// Consume one tick due at or before `now`, returning when it was due.
    pub fn fire(&mut self, now: Duration) -> Option<Duration> {
        let armed = self.armed.as_mut()?;
        if armed.next_due > now {
            return None;
        }
        let due = armed.next_due;
        armed.next_due += armed.interval;
        Some(due)
    }
}
