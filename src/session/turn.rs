use std::mem;
use std::rc::Rc;
use std::time::Instant;

use tracing::{debug, info};

use crate::engine::countdown::Countdown;
use crate::engine::reveal::RevealClock;
use crate::question::{ComposedText, Question};
use crate::session::answer::{AnswerInput, answers_match};
use crate::ui::line_input::LineEdit;

/// Observable phase of a turn. Exactly one is active per question instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnPhase {
    Reading,
    BuzzWindowOpen,
    Buzzed,
    Submitted,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TurnSettings {
    pub chars_per_second: f64,
    pub buzz_window_secs: u32,
}

impl Default for TurnSettings {
    fn default() -> Self {
        Self {
            chars_per_second: 20.0,
            buzz_window_secs: 5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub correct: bool,
    /// The submitted answer value; `None` when the buzz window ran out.
    pub submitted: Option<String>,
    pub timed_out: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TurnEvent {
    RevealComplete,
    CountdownTick(u32),
    TimedOut(Outcome),
}

enum Stage {
    Reading,
    BuzzWindowOpen(Countdown),
    Buzzed {
        frozen: Vec<String>,
        answer: AnswerInput,
    },
    Submitted {
        frozen: Vec<String>,
        answer: AnswerInput,
        outcome: Outcome,
    },
}

/// One practice question driven from first character to scored answer.
///
/// Timers belong to the stage that armed them: the reveal clock ticks only
/// in `Reading`, the countdown lives inside `BuzzWindowOpen`. Every
/// transition cancels the outgoing stage's timer before anything else runs.
pub struct Turn {
    question: Rc<Question>,
    composed: ComposedText,
    clock: RevealClock,
    stage: Stage,
    settings: TurnSettings,
    running: bool,
}

impl Turn {
    pub fn new(question: Rc<Question>, settings: TurnSettings) -> Self {
        let composed = ComposedText::new(&question);
        let clock = RevealClock::new(composed.len(), settings.chars_per_second);
        debug!(id = question.id, len = composed.len(), "new turn");
        Self {
            question,
            composed,
            clock,
            stage: Stage::Reading,
            settings,
            running: false,
        }
    }

    pub fn question(&self) -> &Rc<Question> {
        &self.question
    }

    pub fn composed(&self) -> &ComposedText {
        &self.composed
    }

    pub fn phase(&self) -> TurnPhase {
        match self.stage {
            Stage::Reading => TurnPhase::Reading,
            Stage::BuzzWindowOpen(_) => TurnPhase::BuzzWindowOpen,
            Stage::Buzzed { .. } => TurnPhase::Buzzed,
            Stage::Submitted { .. } => TurnPhase::Submitted,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn cursor(&self) -> usize {
        self.clock.cursor()
    }

    pub fn reveal_progress(&self) -> f64 {
        self.clock.progress()
    }

    /// Seconds left in the buzz window, or `None` outside it.
    pub fn countdown(&self) -> Option<u32> {
        match &self.stage {
            Stage::BuzzWindowOpen(countdown) => countdown.remaining(),
            _ => None,
        }
    }

    pub fn buzz_window_secs(&self) -> u32 {
        self.settings.buzz_window_secs
    }

    pub fn revealed_text(&self) -> &str {
        if self.phase() == TurnPhase::Submitted {
            return self.composed.as_str();
        }
        self.composed.revealed(self.cursor())
    }

    pub fn revealed_body(&self) -> &str {
        if self.phase() == TurnPhase::Submitted {
            return &self.question.text;
        }
        self.composed.revealed_body(self.cursor())
    }

    /// Snapshot captured at the buzz. Never recomputed afterwards.
    pub fn frozen_options(&self) -> Option<&[String]> {
        match &self.stage {
            Stage::Buzzed { frozen, .. } | Stage::Submitted { frozen, .. } => {
                Some(frozen.as_slice())
            }
            _ => None,
        }
    }

    /// Option texts to display: live while reading, the frozen snapshot once
    /// buzzed, in full after submission.
    pub fn option_texts(&self) -> Vec<String> {
        match &self.stage {
            Stage::Reading | Stage::BuzzWindowOpen(_) => self.composed.snapshot(self.cursor()),
            Stage::Buzzed { frozen, .. } => frozen.clone(),
            Stage::Submitted { .. } => self.composed.snapshot(self.composed.len()),
        }
    }

    pub fn answer(&self) -> Option<&AnswerInput> {
        match &self.stage {
            Stage::Buzzed { answer, .. } | Stage::Submitted { answer, .. } => Some(answer),
            _ => None,
        }
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        match &self.stage {
            Stage::Submitted { outcome, .. } => Some(outcome),
            _ => None,
        }
    }

    /// True while buzzed on a question that takes typed text.
    pub fn accepts_text(&self) -> bool {
        matches!(
            &self.stage,
            Stage::Buzzed {
                answer: AnswerInput::ShortAnswer(_),
                ..
            }
        )
    }

    pub fn can_submit(&self) -> bool {
        matches!(&self.stage, Stage::Buzzed { answer, .. } if answer.is_submittable())
    }

    /// Arm the timer belonging to the current stage.
    pub fn start(&mut self, now: Instant) {
        self.running = true;
        match &mut self.stage {
            Stage::Reading => self.clock.start(now),
            Stage::BuzzWindowOpen(countdown) => countdown.resume(now),
            Stage::Buzzed { .. } | Stage::Submitted { .. } => {}
        }
    }

    /// Cancel every live timer. State is kept so `start` can resume.
    pub fn pause(&mut self) {
        self.running = false;
        self.cancel_timers();
    }

    fn cancel_timers(&mut self) {
        self.clock.cancel();
        if let Stage::BuzzWindowOpen(countdown) = &mut self.stage {
            countdown.cancel();
        }
    }

    /// Fire every timer deadline up to `now`.
    pub fn advance(&mut self, now: Instant) -> Vec<TurnEvent> {
        let mut events = Vec::new();
        if !self.running {
            return events;
        }

        if let Stage::Reading = self.stage {
            let progress = self.clock.advance(now);
            if let Some(done_at) = progress.completed_at {
                events.push(TurnEvent::RevealComplete);
                self.open_buzz_window(done_at);
            }
        }

        if let Stage::BuzzWindowOpen(countdown) = &mut self.stage {
            let progress = countdown.advance(now);
            events.extend(progress.ticks.into_iter().map(TurnEvent::CountdownTick));
            if progress.expired_at.is_some() || countdown.is_expired() {
                events.push(TurnEvent::TimedOut(self.time_out()));
            }
        }

        events
    }

    fn open_buzz_window(&mut self, at: Instant) {
        self.clock.cancel();
        debug!(id = self.question.id, secs = self.settings.buzz_window_secs, "buzz window open");
        self.stage = Stage::BuzzWindowOpen(Countdown::start(self.settings.buzz_window_secs, at));
    }

    fn enter_buzzed(&mut self) {
        self.cancel_timers();
        let frozen = self.composed.snapshot(self.clock.cursor());
        self.stage = Stage::Buzzed {
            frozen,
            answer: AnswerInput::for_question(&self.question),
        };
        debug_assert_eq!(
            self.answer().map(AnswerInput::format),
            Some(self.question.format)
        );
    }

    /// Interrupt the reading (or the buzz window). Returns false when the
    /// turn is not accepting a buzz.
    pub fn buzz(&mut self) -> bool {
        if !self.running {
            return false;
        }
        match self.stage {
            Stage::Reading | Stage::BuzzWindowOpen(_) => {
                self.enter_buzzed();
                debug!(id = self.question.id, cursor = self.cursor(), "buzzed");
                true
            }
            _ => false,
        }
    }

    fn time_out(&mut self) -> Outcome {
        self.enter_buzzed();
        let outcome = Outcome {
            correct: false,
            submitted: None,
            timed_out: true,
        };
        self.finish(outcome.clone());
        info!(id = self.question.id, "buzz window expired");
        outcome
    }

    fn finish(&mut self, outcome: Outcome) {
        if let Stage::Buzzed { frozen, answer } = mem::replace(&mut self.stage, Stage::Reading) {
            self.stage = Stage::Submitted {
                frozen,
                answer,
                outcome,
            };
        }
    }

    /// Toggle or pick option `number` (1-based) while buzzed.
    pub fn select_option(&mut self, number: usize) -> bool {
        match &mut self.stage {
            Stage::Buzzed { answer, .. } => answer.select(number),
            _ => false,
        }
    }

    pub fn edit_answer(&mut self, edit: LineEdit) -> bool {
        match &mut self.stage {
            Stage::Buzzed { answer, .. } => answer.edit(edit),
            _ => false,
        }
    }

    /// Score the current answer. Rejected (returns `None`, no transition)
    /// unless buzzed with a non-blank answer.
    pub fn submit(&mut self) -> Option<Outcome> {
        let value = match &self.stage {
            Stage::Buzzed { answer, .. } if answer.is_submittable() => answer.value(),
            _ => return None,
        };
        let correct = answers_match(&value, &self.question.answer);
        let outcome = Outcome {
            correct,
            submitted: Some(value),
            timed_out: false,
        };
        self.finish(outcome.clone());
        info!(id = self.question.id, correct, "answer submitted");
        Some(outcome)
    }
}
