use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::session::turn::TurnPhase;
use crate::ui::line_input::LineEdit;

/// What a key press asks the practice controller to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Start,
    Pause,
    Buzz,
    Submit,
    Skip,
    Next,
    /// 1-based option number.
    Select(usize),
    Edit(LineEdit),
    FocusAnswer,
    BlurAnswer,
    HistoryUp,
    HistoryDown,
    ToggleDetail,
    ResetStats,
    OpenFilters,
    Quit,
}

/// One independently removable key binding group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Concern {
    TextEntry,
    StartPause,
    Buzz,
    Submit,
    Selection,
    SkipNext,
    Focus,
    History,
    Reset,
    Filters,
    Quit,
}

/// Evaluation order. Text entry goes first so a focused answer field
/// swallows every key before the hotkeys see it.
pub const ALL_CONCERNS: [Concern; 11] = [
    Concern::TextEntry,
    Concern::StartPause,
    Concern::Buzz,
    Concern::Submit,
    Concern::Selection,
    Concern::SkipNext,
    Concern::Focus,
    Concern::History,
    Concern::Reset,
    Concern::Filters,
    Concern::Quit,
];

/// Snapshot of controller state the handlers need to decide.
#[derive(Clone, Copy, Debug, Default)]
pub struct DispatchContext {
    pub running: bool,
    pub phase: Option<TurnPhase>,
    pub text_focus: bool,
    pub accepts_text: bool,
    pub option_count: usize,
    pub pool_len: usize,
}

impl DispatchContext {
    fn in_phase(&self, phase: TurnPhase) -> bool {
        self.phase == Some(phase)
    }
}

/// Key bindings for the practice screen. Nothing fires until `mount`;
/// `unmount` drops every binding at once.
#[derive(Clone, Debug)]
pub struct KeyDispatch {
    bindings: Vec<Concern>,
    mounted: bool,
}

impl Default for KeyDispatch {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyDispatch {
    pub fn new() -> Self {
        Self {
            bindings: Vec::new(),
            mounted: false,
        }
    }

    pub fn mount(&mut self) {
        self.bindings = ALL_CONCERNS.to_vec();
        self.mounted = true;
    }

    pub fn unmount(&mut self) {
        self.bindings.clear();
        self.mounted = false;
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn is_bound(&self, concern: Concern) -> bool {
        self.bindings.contains(&concern)
    }

    pub fn bind(&mut self, concern: Concern) {
        if self.mounted && !self.is_bound(concern) {
            self.bindings.push(concern);
            self.bindings
                .sort_by_key(|c| ALL_CONCERNS.iter().position(|a| a == c));
        }
    }

    pub fn unbind(&mut self, concern: Concern) {
        self.bindings.retain(|c| *c != concern);
    }

    /// First bound concern that claims the key wins.
    pub fn dispatch(&self, key: KeyEvent, ctx: &DispatchContext) -> Option<Action> {
        if !self.mounted {
            return None;
        }
        self.bindings
            .iter()
            .find_map(|concern| handle(*concern, key, ctx))
    }
}

fn plain_char(key: &KeyEvent) -> Option<char> {
    if key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
    {
        return None;
    }
    match key.code {
        KeyCode::Char(ch) => Some(ch.to_ascii_lowercase()),
        _ => None,
    }
}

fn handle(concern: Concern, key: KeyEvent, ctx: &DispatchContext) -> Option<Action> {
    if concern == Concern::TextEntry {
        return text_entry(key, ctx);
    }
    if ctx.text_focus {
        return None;
    }

    let ch = plain_char(&key);
    match concern {
        Concern::TextEntry => None,
        Concern::StartPause => match ch {
            Some('s') if !ctx.running => Some(Action::Start),
            Some('p') if ctx.running => Some(Action::Pause),
            _ => None,
        },
        Concern::Buzz => {
            let open = ctx.in_phase(TurnPhase::Reading) || ctx.in_phase(TurnPhase::BuzzWindowOpen);
            (ch == Some(' ') && ctx.running && open).then_some(Action::Buzz)
        }
        Concern::Submit => {
            (key.code == KeyCode::Enter && ctx.in_phase(TurnPhase::Buzzed)).then_some(Action::Submit)
        }
        Concern::Selection => {
            if !ctx.in_phase(TurnPhase::Buzzed) {
                return None;
            }
            let n = ch?.to_digit(10)? as usize;
            (1..=ctx.option_count.min(9))
                .contains(&n)
                .then_some(Action::Select(n))
        }
        Concern::SkipNext => {
            if !ctx.running || ctx.pool_len == 0 {
                return None;
            }
            let submitted = ctx.in_phase(TurnPhase::Submitted);
            match (ch, key.code) {
                (Some('s'), _) if !submitted => Some(Action::Skip),
                (Some('n'), _) | (_, KeyCode::Enter) if submitted => Some(Action::Next),
                _ => None,
            }
        }
        Concern::Focus => (key.code == KeyCode::Tab && ctx.accepts_text).then_some(Action::FocusAnswer),
        Concern::History => match (ch, key.code) {
            (Some('k'), _) | (_, KeyCode::Up) => Some(Action::HistoryUp),
            (Some('j'), _) | (_, KeyCode::Down) => Some(Action::HistoryDown),
            (Some('d'), _) => Some(Action::ToggleDetail),
            _ => None,
        },
        Concern::Reset => (ch == Some('r')).then_some(Action::ResetStats),
        Concern::Filters => (ch == Some('f')).then_some(Action::OpenFilters),
        Concern::Quit => match (ch, key.code) {
            (Some('q'), _) | (_, KeyCode::Esc) => Some(Action::Quit),
            _ => None,
        },
    }
}

fn text_entry(key: KeyEvent, ctx: &DispatchContext) -> Option<Action> {
    if !ctx.text_focus {
        return None;
    }
    match key.code {
        KeyCode::Esc | KeyCode::Tab => Some(Action::BlurAnswer),
        KeyCode::Enter if ctx.in_phase(TurnPhase::Buzzed) => Some(Action::Submit),
        _ if ctx.accepts_text => LineEdit::from_key(key).map(Action::Edit),
        _ => None,
    }
}
