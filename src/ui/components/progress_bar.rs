use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Widget};

use crate::session::turn::{Turn, TurnPhase};
use crate::ui::theme::Theme;

/// One-line gauge used for both reading progress and the buzz countdown.
pub struct ProgressBar<'a> {
    label: String,
    ratio: f64,
    caption: String,
    fill: Color,
    theme: &'a Theme,
}

impl<'a> ProgressBar<'a> {
    pub fn new(label: &str, ratio: f64, caption: String, theme: &'a Theme) -> Self {
        Self {
            label: label.to_string(),
            ratio: ratio.clamp(0.0, 1.0),
            caption,
            fill: theme.colors.bar_filled(),
            theme,
        }
    }

    /// Reading progress while the question is read, the draining buzz
    /// window once it opens, and nothing after a buzz.
    pub fn for_turn(turn: &Turn, theme: &'a Theme) -> Self {
        match (turn.phase(), turn.countdown()) {
            (TurnPhase::BuzzWindowOpen, Some(left)) => {
                let total = turn.buzz_window_secs().max(1);
                let mut bar = Self::new(
                    "Buzz window",
                    left as f64 / total as f64,
                    format!("{left}s"),
                    theme,
                );
                if left <= 2 {
                    bar.fill = theme.colors.warning();
                }
                bar
            }
            (TurnPhase::Reading, _) => {
                let ratio = turn.reveal_progress();
                let label = if turn.is_running() { "Reading" } else { "Paused" };
                Self::new(label, ratio, format!("{:.0}%", ratio * 100.0), theme)
            }
            _ => Self::new("Buzzed", 0.0, String::new(), theme),
        }
    }
}

impl Widget for ProgressBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" {} ", self.label))
            .border_style(Style::default().fg(colors.border()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let filled_width = (self.ratio * inner.width as f64).round() as u16;
        for x in inner.x..inner.x + inner.width {
            let style = if x < inner.x + filled_width {
                Style::default().fg(colors.bg()).bg(self.fill)
            } else {
                Style::default().fg(colors.fg()).bg(colors.bar_empty())
            };
            buf[(x, inner.y)].set_style(style);
        }

        let caption_x = inner.x + (inner.width.saturating_sub(self.caption.len() as u16)) / 2;
        buf.set_string(caption_x, inner.y, &self.caption, Style::default().fg(colors.fg()));
    }
}
