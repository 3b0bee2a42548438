use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::session::ledger::{SessionLedger, StreakKind};
use crate::ui::components::history_panel::HistoryPanel;
use crate::ui::theme::Theme;

/// Session counters on top, the answer history below.
pub struct StatsSidebar<'a> {
    ledger: &'a SessionLedger,
    history_selected: usize,
    history_expanded: bool,
    pool_len: usize,
    seen: usize,
    theme: &'a Theme,
}

impl<'a> StatsSidebar<'a> {
    pub fn new(
        ledger: &'a SessionLedger,
        history_selected: usize,
        history_expanded: bool,
        pool_len: usize,
        seen: usize,
        theme: &'a Theme,
    ) -> Self {
        Self {
            ledger,
            history_selected,
            history_expanded,
            pool_len,
            seen,
            theme,
        }
    }
}

pub fn streak_label(ledger: &SessionLedger) -> String {
    match ledger.streak() {
        Some(s) if s.kind == StreakKind::Correct => format!("{} correct", s.len),
        Some(s) => format!("{} missed", s.len),
        None => "-".to_string(),
    }
}

impl Widget for StatsSidebar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let sections = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(9), Constraint::Min(5)])
            .split(area);

        let accuracy = self.ledger.accuracy();
        let streak_color = match self.ledger.streak() {
            Some(s) if s.kind == StreakKind::Correct => colors.correct(),
            Some(_) => colors.incorrect(),
            None => colors.text_dim(),
        };

        let lines = vec![
            Line::from(vec![
                Span::styled("Attempts: ", Style::default().fg(colors.fg())),
                Span::styled(
                    self.ledger.attempts().to_string(),
                    Style::default().fg(colors.accent()),
                ),
            ]),
            Line::from(vec![
                Span::styled("Correct:  ", Style::default().fg(colors.fg())),
                Span::styled(
                    self.ledger.correct().to_string(),
                    Style::default().fg(colors.correct()),
                ),
            ]),
            Line::from(vec![
                Span::styled("Accuracy: ", Style::default().fg(colors.fg())),
                Span::styled(
                    format!("{accuracy:.1}%"),
                    Style::default().fg(if accuracy >= 80.0 {
                        colors.correct()
                    } else if accuracy >= 50.0 {
                        colors.warning()
                    } else {
                        colors.incorrect()
                    }),
                ),
            ]),
            Line::from(vec![
                Span::styled("Streak:   ", Style::default().fg(colors.fg())),
                Span::styled(streak_label(self.ledger), Style::default().fg(streak_color)),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Seen: ", Style::default().fg(colors.text_dim())),
                Span::styled(
                    format!("{}/{}", self.seen, self.pool_len),
                    Style::default().fg(colors.text_dim()),
                ),
            ]),
        ];

        let block = Block::bordered()
            .title(" Session ")
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        Paragraph::new(lines).block(block).render(sections[0], buf);

        HistoryPanel::new(
            self.ledger.history(),
            self.history_selected,
            self.history_expanded,
            self.theme,
        )
        .render(sections[1], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_streak_label() {
        let mut ledger = SessionLedger::default();
        assert_eq!(streak_label(&ledger), "-");
        ledger.record_attempt(true);
        ledger.record_attempt(true);
        assert_eq!(streak_label(&ledger), "2 correct");
        ledger.record_attempt(false);
        assert_eq!(streak_label(&ledger), "1 missed");
    }
}
