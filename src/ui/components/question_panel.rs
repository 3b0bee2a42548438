use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::question::compose::{attribute_prefix, choice_prefix};
use crate::question::{AnswerFormat, format_answer};
use crate::session::answer::AnswerInput;
use crate::session::turn::{Turn, TurnPhase};
use crate::ui::theme::Theme;

/// The question being read: revealed body, option lines, answer entry and
/// the verdict once submitted.
pub struct QuestionPanel<'a> {
    turn: &'a Turn,
    text_focus: bool,
    theme: &'a Theme,
}

impl<'a> QuestionPanel<'a> {
    pub fn new(turn: &'a Turn, text_focus: bool, theme: &'a Theme) -> Self {
        Self {
            turn,
            text_focus,
            theme,
        }
    }

    fn option_prefix(&self, index: usize) -> String {
        let question = self.turn.question();
        match question.format {
            AnswerFormat::MultipleChoice => question
                .choices
                .get(index)
                .map(|c| choice_prefix(c.label))
                .unwrap_or_default(),
            _ => attribute_prefix(index + 1),
        }
    }

    fn option_marker(&self, answer: Option<&AnswerInput>, number: usize) -> String {
        match answer {
            Some(input @ AnswerInput::Rank { .. }) => match input.rank_of(number) {
                Some(pos) => format!("[{pos}] "),
                None => "[ ] ".to_string(),
            },
            Some(input @ AnswerInput::IdentifyAll { .. }) => {
                if input.is_selected(number) {
                    "[x] ".to_string()
                } else {
                    "[ ] ".to_string()
                }
            }
            _ => String::new(),
        }
    }

    fn option_lines(&self) -> Vec<Line<'static>> {
        let colors = &self.theme.colors;
        let answer = self.turn.answer();
        let texts = self.turn.option_texts();
        let live = matches!(
            self.turn.phase(),
            TurnPhase::Reading | TurnPhase::BuzzWindowOpen
        );
        let mut lines = Vec::with_capacity(texts.len());

        for (i, text) in texts.into_iter().enumerate() {
            // Unreached options stay hidden while reading.
            if live && text.is_empty() {
                continue;
            }
            let number = i + 1;
            let selected = answer.is_some_and(|a| a.is_selected(number));
            let text_style = if selected {
                Style::default()
                    .fg(colors.selected_fg())
                    .bg(colors.selected_bg())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.fg())
            };
            lines.push(Line::from(vec![
                Span::styled(
                    self.option_marker(answer, number),
                    Style::default().fg(colors.accent()),
                ),
                Span::styled(self.option_prefix(i), Style::default().fg(colors.option_label())),
                Span::styled(text, text_style),
            ]));
        }
        lines
    }

    fn answer_line(&self) -> Option<Line<'static>> {
        let colors = &self.theme.colors;
        let input = self.turn.answer()?.text_input()?;
        if self.turn.phase() != TurnPhase::Buzzed {
            return None;
        }
        let border = if self.text_focus {
            colors.border_focused()
        } else {
            colors.text_dim()
        };
        let mut spans = vec![Span::styled("Answer: ", Style::default().fg(border))];
        let (before, cursor, after) = input.render_parts();
        spans.push(Span::styled(before.to_string(), Style::default().fg(colors.fg())));
        if self.text_focus {
            let cursor_style = Style::default().fg(colors.bg()).bg(colors.fg());
            spans.push(Span::styled(
                cursor.map_or_else(|| " ".to_string(), String::from),
                cursor_style,
            ));
        } else if let Some(ch) = cursor {
            spans.push(Span::styled(ch.to_string(), Style::default().fg(colors.fg())));
        }
        spans.push(Span::styled(after.to_string(), Style::default().fg(colors.fg())));
        if !self.text_focus {
            spans.push(Span::styled(
                "  (Tab to type)",
                Style::default().fg(colors.text_dim()),
            ));
        }
        Some(Line::from(spans))
    }

    fn verdict_lines(&self) -> Vec<Line<'static>> {
        let colors = &self.theme.colors;
        let Some(outcome) = self.turn.outcome() else {
            return Vec::new();
        };
        let (label, color) = if outcome.correct {
            ("Correct!", colors.correct())
        } else if outcome.timed_out {
            ("Time's up", colors.warning())
        } else {
            ("Incorrect", colors.incorrect())
        };
        let mut lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                label,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )),
        ];
        if let Some(submitted) = &outcome.submitted {
            lines.push(Line::from(vec![
                Span::styled("Your answer: ", Style::default().fg(colors.text_dim())),
                Span::styled(submitted.clone(), Style::default().fg(colors.fg())),
            ]));
        }
        lines.push(Line::from(vec![
            Span::styled("Answer: ", Style::default().fg(colors.text_dim())),
            Span::styled(
                format_answer(self.turn.question()),
                Style::default().fg(colors.correct()),
            ),
        ]));
        lines
    }
}

impl Widget for QuestionPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let question = self.turn.question();

        let title = format!(
            " {} {} · {} ",
            question.category,
            question.kind.as_str(),
            question.format.label()
        );
        let border_color = match self.turn.phase() {
            TurnPhase::Buzzed => colors.border_focused(),
            _ => colors.border(),
        };
        let block = Block::bordered()
            .title(title)
            .border_style(Style::default().fg(border_color))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines: Vec<Line> = self
            .turn
            .revealed_body()
            .split('\n')
            .map(|l| Line::from(Span::styled(l.to_string(), Style::default().fg(colors.fg()))))
            .collect();

        let options = self.option_lines();
        if !options.is_empty() {
            lines.push(Line::from(""));
            lines.extend(options);
        }

        if let Some(answer) = self.answer_line() {
            lines.push(Line::from(""));
            lines.push(answer);
        }

        lines.extend(self.verdict_lines());

        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .render(inner, buf);
    }
}
