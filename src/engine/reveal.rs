use std::time::{Duration, Instant};

use tracing::debug;

use crate::engine::timer::TimerSlot;

/// What one poll of the reveal clock did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RevealProgress {
    pub advanced: usize,
    /// Deadline of the tick that finished the reveal. Reported exactly once.
    pub completed_at: Option<Instant>,
}

/// Progressive-disclosure clock: one char per tick while running, stops at
/// the end of the text and signals completion once.
#[derive(Debug)]
pub struct RevealClock {
    len: usize,
    cursor: usize,
    per_char: Duration,
    timer: TimerSlot,
    completed: bool,
}

pub fn char_period(chars_per_second: f64) -> Duration {
    let cps = if chars_per_second.is_finite() && chars_per_second > 0.0 {
        chars_per_second
    } else {
        1.0
    };
    Duration::from_secs_f64(1.0 / cps)
}

impl RevealClock {
    pub fn new(len: usize, chars_per_second: f64) -> Self {
        Self {
            len,
            cursor: 0,
            per_char: char_period(chars_per_second),
            timer: TimerSlot::new(),
            completed: false,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_armed()
    }

    pub fn per_char(&self) -> Duration {
        self.per_char
    }

    /// Arm the tick timer from the current cursor. No-op once complete.
    pub fn start(&mut self, now: Instant) {
        if self.completed {
            return;
        }
        self.timer.arm(self.per_char, now);
    }

    pub fn cancel(&mut self) {
        self.timer.cancel();
    }

    pub fn advance(&mut self, now: Instant) -> RevealProgress {
        let mut progress = RevealProgress::default();
        while let Some(due) = self.timer.fire(now) {
            if self.cursor < self.len {
                self.cursor += 1;
                progress.advanced += 1;
            }
            if self.cursor >= self.len {
                self.timer.cancel();
                self.completed = true;
                progress.completed_at = Some(due);
                debug!(len = self.len, "reveal complete");
                break;
            }
        }
        progress
    }

    pub fn progress(&self) -> f64 {
        if self.len == 0 {
            return 1.0;
        }
        self.cursor as f64 / self.len as f64
    }
}
