use std::time::{Duration, Instant};

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// A fixed-period deadline schedule. Nothing fires on its own: the owner
/// polls it with the current instant and gets back each elapsed deadline.
#[derive(Clone, Copy, Debug)]
struct Interval {
    period: Duration,
    next_due: Instant,
}

/// Slot for one interval owned by whatever state armed it.
///
/// `cancel()` releases the interval immediately; a cancelled slot never
/// yields another deadline until it is armed again.
#[derive(Debug, Default)]
pub struct TimerSlot {
    interval: Option<Interval>,
}

impl TimerSlot {
    pub fn new() -> Self {
        Self { interval: None }
    }

    /// Arm (or re-arm) with the first deadline one period after `now`.
    pub fn arm(&mut self, period: Duration, now: Instant) {
        let period = period.max(MIN_PERIOD);
        self.interval = Some(Interval {
            period,
            next_due: now + period,
        });
    }

    pub fn cancel(&mut self) {
        self.interval = None;
    }

    pub fn is_armed(&self) -> bool {
        self.interval.is_some()
    }

    /// Pop the next deadline at or before `now`, if any. Call in a loop to
    /// catch up after a late poll.
    pub fn fire(&mut self, now: Instant) -> Option<Instant> {
        let interval = self.interval.as_mut()?;
        if interval.next_due > now {
            return None;
        }
        let due = interval.next_due;
        interval.next_due += interval.period;
        Some(due)
    }
}
