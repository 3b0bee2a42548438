use std::collections::VecDeque;
use std::rc::Rc;

use chrono::{DateTime, Utc};

use crate::question::{Category, Question, format_answer};

pub const DEFAULT_HISTORY_CAP: usize = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreakKind {
    Correct,
    Incorrect,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Streak {
    pub len: u32,
    pub kind: StreakKind,
}

/// One answered question as shown in the history panel.
#[derive(Clone, Debug)]
pub struct HistoryEntry {
    pub question_id: u64,
    /// Display form of the canonical answer (`"X. Neon"` for multiple choice).
    pub answer: String,
    pub correct: bool,
    pub category: Category,
    pub question: Rc<Question>,
    /// What was submitted; `None` when the buzz window ran out.
    pub submitted: Option<String>,
    /// Option texts visible at the buzz.
    pub frozen: Vec<String>,
    pub at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(
        question: Rc<Question>,
        correct: bool,
        submitted: Option<String>,
        frozen: Vec<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            question_id: question.id,
            answer: format_answer(&question),
            correct,
            category: question.category,
            question,
            submitted,
            frozen,
            at,
        }
    }
}

/// Per-session scoring: attempt and correct counters, the current streak,
/// and a capped most-recent-first history. Lives only as long as the
/// session.
#[derive(Clone, Debug)]
pub struct SessionLedger {
    attempts: u32,
    correct: u32,
    streak: Option<Streak>,
    history: VecDeque<HistoryEntry>,
    cap: usize,
}

impl Default for SessionLedger {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAP)
    }
}

impl SessionLedger {
    pub fn new(cap: usize) -> Self {
        Self {
            attempts: 0,
            correct: 0,
            streak: None,
            history: VecDeque::with_capacity(cap.min(DEFAULT_HISTORY_CAP)),
            cap: cap.max(1),
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn correct(&self) -> u32 {
        self.correct
    }

    pub fn streak(&self) -> Option<Streak> {
        self.streak
    }

    pub fn history(&self) -> &VecDeque<HistoryEntry> {
        &self.history
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Percentage of attempts answered correctly, 0 with no attempts.
    pub fn accuracy(&self) -> f64 {
        if self.attempts == 0 {
            return 0.0;
        }
        self.correct as f64 / self.attempts as f64 * 100.0
    }

    pub fn record_attempt(&mut self, correct: bool) {
        self.attempts += 1;
        if correct {
            self.correct += 1;
        }
        let kind = if correct {
            StreakKind::Correct
        } else {
            StreakKind::Incorrect
        };
        self.streak = match self.streak {
            Some(s) if s.kind == kind => Some(Streak { len: s.len + 1, kind }),
            _ => Some(Streak { len: 1, kind }),
        };
    }

    /// A skip counts as an attempt but leaves the streak and correct count alone.
    pub fn record_skip(&mut self) {
        self.attempts += 1;
    }

    pub fn push_history(&mut self, entry: HistoryEntry) {
        self.history.push_front(entry);
        self.history.truncate(self.cap);
    }

    pub fn reset(&mut self) {
        self.attempts = 0;
        self.correct = 0;
        self.streak = None;
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::fixtures::*;

    fn entry(id: u64, correct: bool) -> HistoryEntry {
        HistoryEntry::new(
            Rc::new(short_answer(id, "Q", "A")),
            correct,
            Some("A".to_string()),
            Vec::new(),
            Utc::now(),
        )
    }

    #[test]
    fn test_streak_follows_last_run() {
        let mut ledger = SessionLedger::default();
        for correct in [true, true, false, false, false] {
            ledger.record_attempt(correct);
        }
        assert_eq!(
            ledger.streak(),
            Some(Streak {
                len: 3,
                kind: StreakKind::Incorrect
            })
        );
        assert_eq!(ledger.attempts(), 5);
        assert_eq!(ledger.correct(), 2);
        assert!((ledger.accuracy() - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_skip_counts_attempt_only() {
        let mut ledger = SessionLedger::default();
        ledger.record_attempt(true);
        ledger.record_skip();
        assert_eq!(ledger.attempts(), 2);
        assert_eq!(ledger.correct(), 1);
        assert_eq!(ledger.streak().map(|s| s.len), Some(1));
    }

    #[test]
    fn test_history_is_capped_most_recent_first() {
        let mut ledger = SessionLedger::new(10);
        for id in 0..15 {
            ledger.push_history(entry(id, id % 2 == 0));
        }
        assert_eq!(ledger.history().len(), 10);
        let ids: Vec<u64> = ledger.history().iter().map(|e| e.question_id).collect();
        assert_eq!(ids, (5..15).rev().collect::<Vec<_>>());
    }

    #[test]
    fn test_entry_uses_display_answer() {
        let q = Rc::new(multiple_choice(4, "Q", &["Iron", "Neon"], "X"));
        let e = HistoryEntry::new(q, true, Some("X".into()), vec![], Utc::now());
        assert_eq!(e.answer, "X. Neon");
        assert_eq!(e.category, Category::Chemistry);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut ledger = SessionLedger::default();
        ledger.record_attempt(false);
        ledger.push_history(entry(1, false));
        ledger.reset();
        assert_eq!(ledger.attempts(), 0);
        assert_eq!(ledger.correct(), 0);
        assert!(ledger.streak().is_none());
        assert!(ledger.history().is_empty());
        assert_eq!(ledger.accuracy(), 0.0);
    }
}
