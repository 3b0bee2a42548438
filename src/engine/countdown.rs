use std::time::{Duration, Instant};

use crate::engine::timer::TimerSlot;

const ONE_SECOND: Duration = Duration::from_secs(1);

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CountdownProgress {
    /// Remaining seconds after each tick that did not expire the window.
    pub ticks: Vec<u32>,
    pub expired_at: Option<Instant>,
}

/// Whole-second countdown for the buzz window. Reads `None` once expired,
/// never a negative or zero value.
#[derive(Debug)]
pub struct Countdown {
    remaining: Option<u32>,
    timer: TimerSlot,
}

impl Countdown {
    /// Start counting down from `seconds`, first tick one second after `now`.
    pub fn start(seconds: u32, now: Instant) -> Self {
        let mut timer = TimerSlot::new();
        let remaining = if seconds == 0 {
            None
        } else {
            timer.arm(ONE_SECOND, now);
            Some(seconds)
        };
        Self { remaining, timer }
    }

    pub fn remaining(&self) -> Option<u32> {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_armed()
    }

    pub fn is_expired(&self) -> bool {
        self.remaining.is_none()
    }

    pub fn cancel(&mut self) {
        self.timer.cancel();
    }

    /// Re-arm after a pause; the partial second before the pause is dropped.
    pub fn resume(&mut self, now: Instant) {
        if self.remaining.is_some() {
            self.timer.arm(ONE_SECOND, now);
        }
    }

    pub fn advance(&mut self, now: Instant) -> CountdownProgress {
        let mut progress = CountdownProgress::default();
        while let Some(due) = self.timer.fire(now) {
            match self.remaining {
                Some(left) if left > 1 => {
                    self.remaining = Some(left - 1);
                    progress.ticks.push(left - 1);
                }
                _ => {
                    self.timer.cancel();
                    self.remaining = None;
                    progress.expired_at = Some(due);
                    break;
                }
            }
        }
        progress
    }
}
