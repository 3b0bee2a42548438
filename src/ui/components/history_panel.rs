use std::collections::VecDeque;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::session::ledger::HistoryEntry;
use crate::ui::theme::Theme;

const ANSWER_PREVIEW_CHARS: usize = 20;

pub fn truncate_answer(answer: &str, max: usize) -> String {
    if answer.chars().count() <= max {
        return answer.to_string();
    }
    let mut out: String = answer.chars().take(max).collect();
    out.push('…');
    out
}

/// Most-recent-first list of answered questions. `d` expands the selected
/// entry to show the full question.
pub struct HistoryPanel<'a> {
    history: &'a VecDeque<HistoryEntry>,
    selected: usize,
    expanded: bool,
    theme: &'a Theme,
}

impl<'a> HistoryPanel<'a> {
    pub fn new(
        history: &'a VecDeque<HistoryEntry>,
        selected: usize,
        expanded: bool,
        theme: &'a Theme,
    ) -> Self {
        Self {
            history,
            selected,
            expanded,
            theme,
        }
    }

    fn detail_lines(&self, entry: &HistoryEntry) -> Vec<Line<'static>> {
        let colors = &self.theme.colors;
        let dim = Style::default().fg(colors.text_dim());
        let mut lines = vec![Line::from(Span::styled(
            entry.question.text.clone(),
            Style::default().fg(colors.fg()),
        ))];
        for (i, text) in entry.frozen.iter().enumerate() {
            let shown = if text.is_empty() { "(unread)" } else { text.as_str() };
            lines.push(Line::from(Span::styled(format!("  {}. {shown}", i + 1), dim)));
        }
        let submitted = entry.submitted.as_deref().unwrap_or("(none)");
        lines.push(Line::from(vec![
            Span::styled("  you: ", dim),
            Span::styled(submitted.to_string(), Style::default().fg(colors.fg())),
        ]));
        lines.push(Line::from(vec![
            Span::styled("  answer: ", dim),
            Span::styled(entry.answer.clone(), Style::default().fg(colors.correct())),
        ]));
        lines.push(Line::from(Span::styled(
            format!("  {}", entry.at.format("%H:%M:%S UTC")),
            dim,
        )));
        lines
    }
}

impl Widget for HistoryPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" History ({}) ", self.history.len()))
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        if self.history.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                "No answers yet",
                Style::default().fg(colors.text_dim()),
            )))
            .render(inner, buf);
            return;
        }

        let mut lines = Vec::new();
        for (i, entry) in self.history.iter().enumerate() {
            let (mark, mark_color) = if entry.correct {
                ("✓", colors.correct())
            } else {
                ("✗", colors.incorrect())
            };
            let is_selected = i == self.selected;
            let row_style = if is_selected {
                Style::default()
                    .fg(colors.selected_fg())
                    .bg(colors.selected_bg())
            } else {
                Style::default().fg(colors.fg())
            };
            lines.push(Line::from(vec![
                Span::styled(format!("{mark} "), Style::default().fg(mark_color)),
                Span::styled(format!("{:<9}", entry.category.as_str()), row_style),
                Span::styled(
                    truncate_answer(&entry.answer, ANSWER_PREVIEW_CHARS),
                    row_style.add_modifier(Modifier::BOLD),
                ),
            ]));
            if is_selected && self.expanded {
                lines.extend(self.detail_lines(entry));
            }
        }

        // Keep the selected row on screen.
        let visible = inner.height as usize;
        let scroll = self.selected.saturating_sub(visible.saturating_sub(1) / 2);
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((scroll.min(u16::MAX as usize) as u16, 0))
            .render(inner, buf);
    }
}
