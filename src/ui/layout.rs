use ratatui::layout::{Constraint, Direction, Layout, Rect};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutTier {
    Wide,   // ≥100 cols: question panel + sidebar with stats and history
    Medium, // 60-99 cols: full-width question, stats in header, history below
    Narrow, // <60 cols: question and header only
}

impl LayoutTier {
    pub fn from_area(area: Rect) -> Self {
        if area.width >= 100 {
            LayoutTier::Wide
        } else if area.width >= 60 {
            LayoutTier::Medium
        } else {
            LayoutTier::Narrow
        }
    }

    pub fn show_sidebar(&self) -> bool {
        *self == LayoutTier::Wide
    }

    pub fn show_history_below(&self, height: u16) -> bool {
        *self == LayoutTier::Medium && height >= 24
    }
}

pub struct AppLayout {
    pub header: Rect,
    pub main: Rect,
    pub countdown: Rect,
    pub sidebar: Option<Rect>,
    pub history: Option<Rect>,
    pub footer: Rect,
    pub tier: LayoutTier,
}

impl AppLayout {
    pub fn new(area: Rect) -> Self {
        let tier = LayoutTier::from_area(area);

        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(3),
                Constraint::Length(3),
            ])
            .split(area);

        let (main, sidebar, history) = if tier.show_sidebar() {
            let horizontal = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
                .split(vertical[1]);
            (horizontal[0], Some(horizontal[1]), None)
        } else if tier.show_history_below(area.height) {
            let split = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(8), Constraint::Length(8)])
                .split(vertical[1]);
            (split[0], None, Some(split[1]))
        } else {
            (vertical[1], None, None)
        };

        Self {
            header: vertical[0],
            main,
            countdown: vertical[2],
            sidebar,
            history,
            footer: vertical[3],
            tier,
        }
    }
}

pub fn pack_hint_lines(hints: &[&str], width: usize) -> Vec<String> {
    if width == 0 || hints.is_empty() {
        return Vec::new();
    }

    let prefix = "  ";
    let separator = "  ";
    let mut out: Vec<String> = Vec::new();
    let mut current = prefix.to_string();
    let mut has_hint = false;

    for hint in hints {
        if hint.is_empty() {
            continue;
        }
        let candidate = if has_hint {
            format!("{current}{separator}{hint}")
        } else {
            format!("{current}{hint}")
        };
        if candidate.chars().count() <= width {
            current = candidate;
            has_hint = true;
        } else {
            if has_hint {
                out.push(current);
            }
            current = format!("{prefix}{hint}");
            has_hint = true;
        }
    }

    if has_hint {
        out.push(current);
    }
    out
}

pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    const MIN_POPUP_WIDTH: u16 = 48;
    const MIN_POPUP_HEIGHT: u16 = 16;

    let requested_w = area.width.saturating_mul(percent_x.min(100)) / 100;
    let requested_h = area.height.saturating_mul(percent_y.min(100)) / 100;

    let target_w = requested_w.max(MIN_POPUP_WIDTH).min(area.width);
    let target_h = requested_h.max(MIN_POPUP_HEIGHT).min(area.height);

    let left = area
        .x
        .saturating_add((area.width.saturating_sub(target_w)) / 2);
    let top = area
        .y
        .saturating_add((area.height.saturating_sub(target_h)) / 2);

    Rect::new(left, top, target_w, target_h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiers_by_width() {
        assert_eq!(LayoutTier::from_area(Rect::new(0, 0, 120, 40)), LayoutTier::Wide);
        assert_eq!(LayoutTier::from_area(Rect::new(0, 0, 80, 40)), LayoutTier::Medium);
        assert_eq!(LayoutTier::from_area(Rect::new(0, 0, 40, 40)), LayoutTier::Narrow);
    }

    #[test]
    fn test_wide_layout_has_sidebar() {
        let layout = AppLayout::new(Rect::new(0, 0, 120, 40));
        assert!(layout.sidebar.is_some());
        assert!(layout.history.is_none());
        assert_eq!(layout.header.height, 3);
        assert_eq!(layout.footer.height, 3);
    }

    #[test]
    fn test_medium_layout_puts_history_below_when_tall() {
        assert!(AppLayout::new(Rect::new(0, 0, 80, 40)).history.is_some());
        assert!(AppLayout::new(Rect::new(0, 0, 80, 20)).history.is_none());
    }

    #[test]
    fn test_pack_hint_lines_wraps() {
        let lines = pack_hint_lines(&["[s] Start", "[p] Pause", "[q] Quit"], 24);
        assert_eq!(lines, vec!["  [s] Start  [p] Pause", "  [q] Quit"]);
        assert!(pack_hint_lines(&["x"], 0).is_empty());
    }

    #[test]
    fn test_centered_rect_fits_area() {
        let area = Rect::new(0, 0, 30, 10);
        let r = centered_rect(50, 50, area);
        assert_eq!(r, area);
        let big = Rect::new(0, 0, 200, 60);
        let r = centered_rect(50, 50, big);
        assert_eq!((r.width, r.height), (100, 30));
        assert_eq!((r.x, r.y), (50, 15));
    }
}
