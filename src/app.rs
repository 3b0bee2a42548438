use std::collections::HashSet;
use std::rc::Rc;
use std::time::Instant;

use chrono::Utc;
use crossterm::event::KeyEvent;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{debug, info};

use crate::config::Config;
use crate::engine::pool::build_practice_pool;
use crate::engine::selector::{pick_random_unseen_index, random_next_index};
use crate::engine::{PoolFilter, TypeFilter};
use crate::keyboard::{Action, DispatchContext, KeyDispatch};
use crate::question::{ALL_CATEGORIES, ALL_FORMATS, AnswerFormat, Category, Question};
use crate::session::ledger::{HistoryEntry, SessionLedger};
use crate::session::turn::{Outcome, Turn, TurnEvent, TurnPhase};
use crate::ui::line_input::LineEdit;
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Practice,
    Filters,
}

/// One row of the filter screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterRow {
    Category(Category),
    QuestionType,
    Format(AnswerFormat),
}

pub fn filter_rows() -> Vec<FilterRow> {
    ALL_CATEGORIES
        .iter()
        .map(|c| FilterRow::Category(*c))
        .chain(std::iter::once(FilterRow::QuestionType))
        .chain(ALL_FORMATS.iter().map(|f| FilterRow::Format(*f)))
        .collect()
}

/// Practice controller. Owns the question list, the filtered pool, the live
/// turn and the session ledger; every user action funnels through here.
pub struct App {
    pub screen: AppScreen,
    pub config: Config,
    pub theme: &'static Theme,
    pub ledger: SessionLedger,
    pub text_focus: bool,
    pub history_selected: usize,
    pub history_expanded: bool,
    pub filter_selected: usize,
    pub should_quit: bool,
    questions: Vec<Rc<Question>>,
    filter: PoolFilter,
    pool: Vec<Rc<Question>>,
    current: usize,
    seen: HashSet<u64>,
    turn: Option<Turn>,
    dispatch: KeyDispatch,
    rng: SmallRng,
}

impl App {
    pub fn new(config: Config, questions: Vec<Rc<Question>>, seed: Option<u64>) -> Self {
        let loaded_theme = Theme::load(&config.theme).unwrap_or_default();
        let theme: &'static Theme = Box::leak(Box::new(loaded_theme));
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let filter = config.pool_filter();
        let ledger = SessionLedger::new(config.history_cap);

        let mut app = Self {
            screen: AppScreen::Practice,
            config,
            theme,
            ledger,
            text_focus: false,
            history_selected: 0,
            history_expanded: false,
            filter_selected: 0,
            should_quit: false,
            questions,
            filter,
            pool: Vec::new(),
            current: 0,
            seen: HashSet::new(),
            turn: None,
            dispatch: KeyDispatch::new(),
            rng,
        };
        app.rebuild_pool();
        app.dispatch.mount();
        app
    }

    pub fn questions(&self) -> &[Rc<Question>] {
        &self.questions
    }

    pub fn filter(&self) -> &PoolFilter {
        &self.filter
    }

    pub fn pool(&self) -> &[Rc<Question>] {
        &self.pool
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn seen(&self) -> &HashSet<u64> {
        &self.seen
    }

    /// Seen ids that belong to the current pool.
    pub fn seen_in_pool(&self) -> usize {
        self.pool.iter().filter(|q| self.seen.contains(&q.id)).count()
    }

    pub fn turn(&self) -> Option<&Turn> {
        self.turn.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.turn.as_ref().is_some_and(Turn::is_running)
    }

    pub fn phase(&self) -> Option<TurnPhase> {
        self.turn.as_ref().map(Turn::phase)
    }

    pub fn dispatch(&self) -> &KeyDispatch {
        &self.dispatch
    }

    pub fn dispatch_context(&self) -> DispatchContext {
        let turn = self.turn.as_ref();
        DispatchContext {
            running: self.is_running(),
            phase: self.phase(),
            text_focus: self.text_focus,
            accepts_text: turn.is_some_and(Turn::accepts_text),
            option_count: turn.map_or(0, |t| t.question().option_count()),
            pool_len: self.pool.len(),
        }
    }

    /// Route a practice-screen key through the dispatch table.
    pub fn handle_practice_key(&mut self, key: KeyEvent, now: Instant) {
        let ctx = self.dispatch_context();
        if let Some(action) = self.dispatch.dispatch(key, &ctx) {
            self.apply(action, now);
        }
    }

    pub fn apply(&mut self, action: Action, now: Instant) {
        debug!(?action, "action");
        match action {
            Action::Start => self.start(now),
            Action::Pause => self.pause(),
            Action::Buzz => self.buzz(),
            Action::Submit => self.submit(),
            Action::Skip => self.skip(now),
            Action::Next => self.next(now),
            Action::Select(n) => self.select_option(n),
            Action::Edit(edit) => self.edit_answer(edit),
            Action::FocusAnswer => {
                self.text_focus = self.turn.as_ref().is_some_and(Turn::accepts_text);
            }
            Action::BlurAnswer => self.text_focus = false,
            Action::HistoryUp => {
                self.history_selected = self.history_selected.saturating_sub(1);
            }
            Action::HistoryDown => {
                let len = self.ledger.history().len();
                if self.history_selected + 1 < len {
                    self.history_selected += 1;
                }
            }
            Action::ToggleDetail => self.history_expanded = !self.history_expanded,
            Action::ResetStats => self.reset(),
            Action::OpenFilters => self.open_filters(),
            Action::Quit => self.should_quit = true,
        }
    }

    pub fn start(&mut self, now: Instant) {
        if let Some(turn) = self.turn.as_mut() {
            turn.start(now);
            info!(id = turn.question().id, "practice started");
        }
    }

    pub fn pause(&mut self) {
        if let Some(turn) = self.turn.as_mut() {
            turn.pause();
        }
    }

    pub fn buzz(&mut self) {
        let Some(turn) = self.turn.as_mut() else {
            return;
        };
        if turn.buzz() && turn.accepts_text() {
            self.text_focus = true;
        }
    }

    pub fn select_option(&mut self, number: usize) {
        if let Some(turn) = self.turn.as_mut() {
            turn.select_option(number);
        }
    }

    pub fn edit_answer(&mut self, edit: LineEdit) {
        if let Some(turn) = self.turn.as_mut() {
            turn.edit_answer(edit);
        }
    }

    pub fn submit(&mut self) {
        let Some(outcome) = self.turn.as_mut().and_then(Turn::submit) else {
            return;
        };
        self.record_outcome(outcome);
    }

    /// Fire due timers. A buzz-window timeout is scored like a submission.
    pub fn tick(&mut self, now: Instant) {
        let Some(turn) = self.turn.as_mut() else {
            return;
        };
        for event in turn.advance(now) {
            if let TurnEvent::TimedOut(outcome) = event {
                self.record_outcome(outcome);
            }
        }
    }

    fn record_outcome(&mut self, outcome: Outcome) {
        let Some(turn) = self.turn.as_ref() else {
            return;
        };
        let question = Rc::clone(turn.question());
        let frozen = turn.frozen_options().map(<[String]>::to_vec).unwrap_or_default();

        self.ledger.record_attempt(outcome.correct);
        self.seen.insert(question.id);
        self.ledger.push_history(HistoryEntry::new(
            question,
            outcome.correct,
            outcome.submitted,
            frozen,
            Utc::now(),
        ));
        self.text_focus = false;
        self.history_selected = 0;
    }

    /// Abandon the current question without answering. Counts as a miss in
    /// the history and as an attempt, but does not touch the streak.
    pub fn skip(&mut self, now: Instant) {
        if self.pool.len() <= 1 {
            return;
        }
        let Some(turn) = self.turn.as_ref() else {
            return;
        };
        if turn.phase() == TurnPhase::Submitted {
            return;
        }
        let question = Rc::clone(turn.question());
        let frozen = turn.option_texts();
        info!(id = question.id, "question skipped");

        self.ledger.record_skip();
        self.seen.insert(question.id);
        self.ledger
            .push_history(HistoryEntry::new(question, false, None, frozen, Utc::now()));
        self.history_selected = 0;
        self.advance_question(now);
    }

    /// Move on after a submitted turn.
    pub fn next(&mut self, now: Instant) {
        if self.phase() != Some(TurnPhase::Submitted) || self.pool.len() <= 1 {
            return;
        }
        self.advance_question(now);
    }

    fn advance_question(&mut self, now: Instant) {
        let was_running = self.is_running();
        self.current = pick_random_unseen_index(&self.pool, self.current, &self.seen, &mut self.rng);
        self.text_focus = false;
        self.turn = self.new_turn();
        if was_running {
            self.start(now);
        }
    }

    pub fn reset(&mut self) {
        self.ledger.reset();
        self.seen.clear();
        self.history_selected = 0;
        self.history_expanded = false;
        info!("session stats reset");
    }

    fn new_turn(&self) -> Option<Turn> {
        self.pool
            .get(self.current)
            .map(|q| Turn::new(Rc::clone(q), self.config.turn_settings()))
    }

    /// Recompute the pool from the current filter. The live turn is dropped,
    /// which cancels its timers, and a fresh index is drawn.
    pub fn rebuild_pool(&mut self) {
        self.pool = build_practice_pool(&self.questions, &self.filter);
        self.current = random_next_index(self.pool.len(), None, &mut self.rng);
        self.text_focus = false;
        self.turn = self.new_turn();
        self.config.categories = self.filter.categories.clone();
        self.config.question_type = self.filter.question_type;
        self.config.formats = self.filter.formats.clone();
        debug!(pool = self.pool.len(), "practice pool rebuilt");
    }

    pub fn toggle_category(&mut self, category: Category) {
        self.filter.toggle_category(category);
        self.rebuild_pool();
    }

    pub fn set_question_type(&mut self, question_type: TypeFilter) {
        if self.filter.question_type != question_type {
            self.filter.question_type = question_type;
            self.rebuild_pool();
        }
    }

    pub fn toggle_format(&mut self, format: AnswerFormat) {
        self.filter.toggle_format(format);
        self.rebuild_pool();
    }

    pub fn open_filters(&mut self) {
        self.pause();
        self.dispatch.unmount();
        self.screen = AppScreen::Filters;
    }

    pub fn close_filters(&mut self) {
        self.screen = AppScreen::Practice;
        self.dispatch.mount();
    }

    pub fn filter_row_selected(&mut self, delta: isize) {
        let rows = filter_rows().len();
        self.filter_selected = self
            .filter_selected
            .saturating_add_signed(delta)
            .min(rows.saturating_sub(1));
    }

    pub fn toggle_selected_filter(&mut self) {
        match filter_rows().get(self.filter_selected).copied() {
            Some(FilterRow::Category(c)) => self.toggle_category(c),
            Some(FilterRow::QuestionType) => {
                self.set_question_type(self.filter.question_type.cycle());
            }
            Some(FilterRow::Format(f)) => self.toggle_format(f),
            None => {}
        }
    }

    pub fn is_row_enabled(&self, row: FilterRow) -> bool {
        match row {
            FilterRow::Category(c) => self.filter.categories.contains(&c),
            FilterRow::QuestionType => true,
            FilterRow::Format(f) => self.filter.formats.contains(&f),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crossterm::event::{KeyCode, KeyModifiers};

    use super::*;
    use crate::question::fixtures::*;

    fn questions() -> Vec<Rc<Question>> {
        let mut qs = vec![
            short_answer(1, "Alpha?", "a"),
            short_answer(2, "Beta?", "b"),
            multiple_choice(3, "Gamma?", &["x", "y"], "W"),
            with_attributes(4, AnswerFormat::Rank, "Delta?", &["p", "q"], "1, 2"),
        ];
        qs[1].category = Category::Math;
        qs.into_iter().map(Rc::new).collect()
    }

    fn app() -> App {
        App::new(Config::default(), questions(), Some(7))
    }

    #[test]
    fn test_new_app_has_reading_turn_paused() {
        let app = app();
        assert_eq!(app.pool().len(), 4);
        assert_eq!(app.phase(), Some(TurnPhase::Reading));
        assert!(!app.is_running());
        assert!(app.dispatch().is_mounted());
    }

    #[test]
    fn test_skip_records_miss_and_moves_on() {
        let mut app = app();
        let t0 = Instant::now();
        app.start(t0);
        let first = app.turn().unwrap().question().id;
        app.skip(t0);

        assert_eq!(app.ledger.attempts(), 1);
        assert_eq!(app.ledger.correct(), 0);
        assert!(app.ledger.streak().is_none());
        let entry = &app.ledger.history()[0];
        assert_eq!(entry.question_id, first);
        assert!(!entry.correct);
        assert!(entry.submitted.is_none());
        assert!(app.seen().contains(&first));

        assert_ne!(app.turn().unwrap().question().id, first);
        assert!(app.is_running());
    }

    #[test]
    fn test_submit_then_next() {
        let mut app = app();
        let t0 = Instant::now();
        app.start(t0);
        app.buzz();
        let question = Rc::clone(app.turn().unwrap().question());
        match question.format {
            AnswerFormat::ShortAnswer => {
                assert!(app.text_focus);
                for ch in question.answer.chars() {
                    app.edit_answer(LineEdit::Insert(ch));
                }
            }
            AnswerFormat::MultipleChoice => app.select_option(1),
            _ => {
                app.select_option(1);
                app.select_option(2);
            }
        }
        app.submit();
        assert_eq!(app.phase(), Some(TurnPhase::Submitted));
        assert_eq!(app.ledger.correct(), 1);
        assert!(!app.text_focus);
        assert!(app.seen().contains(&question.id));

        app.next(t0);
        assert_eq!(app.phase(), Some(TurnPhase::Reading));
        assert_ne!(app.turn().unwrap().question().id, question.id);
    }

    #[test]
    fn test_timeout_is_recorded_on_tick() {
        let mut app = app();
        let t0 = Instant::now();
        app.start(t0);
        app.tick(t0 + Duration::from_secs(120));
        assert_eq!(app.phase(), Some(TurnPhase::Submitted));
        assert_eq!(app.ledger.attempts(), 1);
        assert!(!app.ledger.history()[0].correct);
    }

    #[test]
    fn test_buzz_read_before_last_countdown_deadline_wins() {
        let mut app = app();
        let t0 = Instant::now();
        app.start(t0);
        let read_for = Duration::from_millis(50) * app.turn().unwrap().composed().len() as u32;
        let window_open = t0 + read_for;

        app.tick(window_open + Duration::from_millis(4980));
        assert_eq!(app.phase(), Some(TurnPhase::BuzzWindowOpen));

        let at = window_open + Duration::from_millis(4990);
        app.tick(at);
        app.handle_practice_key(KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE), at);
        assert_eq!(app.phase(), Some(TurnPhase::Buzzed));
        assert_eq!(app.ledger.attempts(), 0);

        app.tick(window_open + Duration::from_secs(30));
        assert_eq!(app.phase(), Some(TurnPhase::Buzzed));
        assert_eq!(app.ledger.attempts(), 0);
    }

    #[test]
    fn test_seen_in_pool_ignores_filtered_out_ids() {
        let mut app = app();
        let t0 = Instant::now();
        app.start(t0);
        let first = app.turn().unwrap().question().id;
        app.skip(t0);
        assert_eq!(app.seen_in_pool(), 1);

        let category = app.questions().iter().find(|q| q.id == first).unwrap().category;
        app.toggle_category(category);
        assert!(!app.pool().is_empty());
        assert!(app.seen().contains(&first));
        assert_eq!(app.seen_in_pool(), 0);
    }

    #[test]
    fn test_filter_change_pauses_and_reseeds() {
        let mut app = app();
        app.start(Instant::now());
        app.set_question_type(TypeFilter::Bonus);
        assert_eq!(app.pool().len(), 1);
        assert_eq!(app.pool()[0].id, 4);
        assert!(!app.is_running());
        assert_eq!(app.current_index(), 0);
        assert_eq!(app.config.question_type, TypeFilter::Bonus);
    }

    #[test]
    fn test_empty_pool_has_no_turn() {
        let mut app = app();
        app.toggle_format(AnswerFormat::IdentifyAll);
        assert!(app.pool().is_empty());
        assert!(app.turn().is_none());
        app.start(Instant::now());
        app.buzz();
        app.skip(Instant::now());
        assert_eq!(app.ledger.attempts(), 0);
    }

    #[test]
    fn test_reset_clears_ledger_and_seen() {
        let mut app = app();
        let t0 = Instant::now();
        app.start(t0);
        app.skip(t0);
        app.reset();
        assert_eq!(app.ledger.attempts(), 0);
        assert!(app.ledger.history().is_empty());
        assert!(app.seen().is_empty());
    }

    #[test]
    fn test_filter_screen_unmounts_dispatch() {
        let mut app = app();
        app.apply(Action::OpenFilters, Instant::now());
        assert_eq!(app.screen, AppScreen::Filters);
        assert!(!app.dispatch().is_mounted());
        app.close_filters();
        assert!(app.dispatch().is_mounted());
    }

    #[test]
    fn test_filter_rows_toggle() {
        let mut app = app();
        assert_eq!(filter_rows().len(), 12);
        app.filter_selected = 0;
        app.toggle_selected_filter();
        assert!(!app.is_row_enabled(FilterRow::Category(Category::Physics)));
        assert!(app.pool().iter().all(|q| q.category != Category::Physics));

        app.filter_row_selected(100);
        assert_eq!(app.filter_selected, 11);
        app.filter_row_selected(-100);
        assert_eq!(app.filter_selected, 0);
    }

    #[test]
    fn test_history_navigation_is_clamped() {
        let mut app = app();
        let t0 = Instant::now();
        app.start(t0);
        app.skip(t0);
        app.skip(t0);
        app.apply(Action::HistoryDown, t0);
        app.apply(Action::HistoryDown, t0);
        assert_eq!(app.history_selected, 1);
        app.apply(Action::HistoryUp, t0);
        app.apply(Action::HistoryUp, t0);
        assert_eq!(app.history_selected, 0);
    }
}
