use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Result, bail};
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Wrap};
use tracing::{info, warn};

use buzzread::app::{App, AppScreen, FilterRow, filter_rows};
use buzzread::config::Config;
use buzzread::engine::TypeFilter;
use buzzread::event::{AppEvent, EventHandler};
use buzzread::logging;
use buzzread::question::{ALL_FORMATS, Category};
use buzzread::session::turn::TurnPhase;
use buzzread::store::question_bank::QuestionBank;
use buzzread::ui::components::history_panel::HistoryPanel;
use buzzread::ui::components::progress_bar::ProgressBar;
use buzzread::ui::components::question_panel::QuestionPanel;
use buzzread::ui::components::stats_sidebar::{StatsSidebar, streak_label};
use buzzread::ui::layout::{AppLayout, centered_rect, pack_hint_lines};
use buzzread::ui::theme::Theme;

#[derive(Parser)]
#[command(
    name = "buzzread",
    version,
    about = "Read science bowl questions aloud-style and buzz in"
)]
struct Cli {
    #[arg(short, long, help = "JSON question bank (defaults to the bundled sample)")]
    questions: Option<PathBuf>,

    #[arg(
        short,
        long,
        value_delimiter = ',',
        help = "Categories to practice, comma separated (Physics,Chemistry,ESS,...)"
    )]
    categories: Option<Vec<String>>,

    #[arg(short = 'T', long = "type", help = "Question type: all, tossup or bonus")]
    question_type: Option<String>,

    #[arg(short, long, help = "Reading speed in characters per second")]
    speed: Option<f64>,

    #[arg(short, long, help = "Buzz window length in seconds")]
    window: Option<u32>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(long, help = "Seed for question order")]
    seed: Option<u64>,

    #[arg(long, help = "Log level (error, warn, info, debug, trace)")]
    log_level: Option<String>,
}

fn apply_overrides(config: &mut Config, cli: &Cli) -> Result<()> {
    if let Some(path) = &cli.questions {
        config.questions_file = Some(path.clone());
    }
    if let Some(names) = &cli.categories {
        let mut categories = Vec::new();
        for name in names {
            match Category::from_name(name) {
                Some(c) => categories.push(c),
                None => bail!("unknown category '{name}'"),
            }
        }
        config.categories = categories;
    }
    if let Some(name) = &cli.question_type {
        match TypeFilter::from_name(name) {
            Some(t) => config.question_type = t,
            None => bail!("unknown question type '{name}'"),
        }
    }
    if let Some(speed) = cli.speed {
        config.chars_per_second = speed;
    }
    if let Some(window) = cli.window {
        config.buzz_window_secs = window;
    }
    if let Some(theme) = &cli.theme {
        config.theme = theme.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    config.validate();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };
    apply_overrides(&mut config, &cli)?;

    if let Err(e) = logging::init(&config.log_level) {
        eprintln!("warning: logging disabled: {e:#}");
    }
    if let Some(e) = config_error {
        warn!(error = %format!("{e:#}"), "config unreadable, using defaults");
    }

    let bank = QuestionBank::load(config.questions_file.as_deref())?;
    if bank.is_empty() {
        bail!("no usable questions in the question bank");
    }
    info!(questions = bank.len(), "starting practice");

    if Theme::load(&config.theme).is_none() {
        warn!(theme = %config.theme, "unknown theme, using default");
    }
    let mut app = App::new(config, bank.into_questions(), cli.seed);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(16));

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key, at) => {
                // Only deadlines due before the key was read land first.
                app.tick(at);
                handle_key(app, key, at);
            }
            AppEvent::Tick(now) => app.tick(now),
            AppEvent::Resize => {}
        }

        if app.should_quit {
            info!(
                attempts = app.ledger.attempts(),
                correct = app.ledger.correct(),
                "session ended"
            );
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent, now: Instant) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.screen {
        AppScreen::Practice => app.handle_practice_key(key, now),
        AppScreen::Filters => handle_filters_key(app, key),
    }
}

fn handle_filters_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.filter_row_selected(-1),
        KeyCode::Down | KeyCode::Char('j') => app.filter_row_selected(1),
        KeyCode::Char(' ') | KeyCode::Enter => app.toggle_selected_filter(),
        KeyCode::Esc | KeyCode::Char('f') | KeyCode::Char('q') => {
            if let Err(e) = app.config.save_filters() {
                warn!(error = %format!("{e:#}"), "could not save filters");
            }
            app.close_filters();
        }
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;
    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    render_practice(frame, app);
    if app.screen == AppScreen::Filters {
        render_filters(frame, app);
    }
}

fn footer_hints(app: &App) -> Vec<&'static str> {
    if app.text_focus {
        return vec!["[Enter] Submit", "[Esc] Leave answer field"];
    }
    let mut hints = Vec::new();
    match (app.is_running(), app.phase()) {
        (_, None) => {}
        (false, Some(_)) => hints.push("[s] Start"),
        (true, Some(TurnPhase::Reading | TurnPhase::BuzzWindowOpen)) => {
            hints.extend(["[Space] Buzz", "[p] Pause", "[s] Skip"]);
        }
        (true, Some(TurnPhase::Buzzed)) => {
            hints.extend(["[1-9] Select", "[Tab] Type answer", "[Enter] Submit", "[s] Skip"]);
        }
        (true, Some(TurnPhase::Submitted)) => hints.extend(["[n/Enter] Next", "[p] Pause"]),
    }
    hints.extend(["[j/k] History", "[d] Details", "[f] Filters", "[r] Reset", "[q] Quit"]);
    hints
}

fn render_practice(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;
    let layout = AppLayout::new(area);

    let header_style = Style::default()
        .fg(colors.header_fg())
        .bg(colors.header_bg())
        .add_modifier(Modifier::BOLD);
    let mut header_text = format!(" buzzread | Pool: {}", app.pool().len());
    if !layout.tier.show_sidebar() {
        header_text.push_str(&format!(
            " | {}/{} correct | Streak: {}",
            app.ledger.correct(),
            app.ledger.attempts(),
            streak_label(&app.ledger)
        ));
    }
    let header = Paragraph::new(Line::from(Span::styled(header_text, header_style)))
        .block(Block::bordered().border_style(Style::default().fg(colors.border())))
        .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, layout.header);

    match app.turn() {
        Some(turn) => {
            frame.render_widget(QuestionPanel::new(turn, app.text_focus, app.theme), layout.main);
            frame.render_widget(ProgressBar::for_turn(turn, app.theme), layout.countdown);
        }
        None => {
            let empty = Paragraph::new(Line::from(Span::styled(
                "No questions match the current filters. Press [f] to change them.",
                Style::default().fg(colors.warning()),
            )))
            .wrap(Wrap { trim: true })
            .block(Block::bordered().border_style(Style::default().fg(colors.border())));
            frame.render_widget(empty, layout.main);
        }
    }

    if let Some(sidebar) = layout.sidebar {
        let widget = StatsSidebar::new(
            &app.ledger,
            app.history_selected,
            app.history_expanded,
            app.pool().len(),
            app.seen_in_pool(),
            app.theme,
        );
        frame.render_widget(widget, sidebar);
    }
    if let Some(history) = layout.history {
        let widget = HistoryPanel::new(
            app.ledger.history(),
            app.history_selected,
            app.history_expanded,
            app.theme,
        );
        frame.render_widget(widget, history);
    }

    let hints = footer_hints(app);
    let lines: Vec<Line> = pack_hint_lines(&hints, layout.footer.width as usize)
        .into_iter()
        .map(|l| Line::from(Span::styled(l, Style::default().fg(colors.text_dim()))))
        .collect();
    frame.render_widget(Paragraph::new(lines), layout.footer);
}

fn render_filters(frame: &mut ratatui::Frame, app: &App) {
    let colors = &app.theme.colors;
    let popup = centered_rect(50, 60, frame.area());
    frame.render_widget(Clear, popup);

    let mut lines = Vec::new();
    for (i, row) in filter_rows().into_iter().enumerate() {
        let label = match row {
            FilterRow::Category(c) => {
                let mark = if app.is_row_enabled(row) { "[x]" } else { "[ ]" };
                format!("{mark} {c}")
            }
            FilterRow::QuestionType => format!("Type: {}", app.filter().question_type),
            FilterRow::Format(f) => {
                let mark = if app.is_row_enabled(row) { "[x]" } else { "[ ]" };
                format!("{mark} {}", f.label())
            }
        };
        let style = if i == app.filter_selected {
            Style::default()
                .fg(colors.selected_fg())
                .bg(colors.selected_bg())
        } else {
            Style::default().fg(colors.fg())
        };
        if row == FilterRow::QuestionType || row == FilterRow::Format(ALL_FORMATS[0]) {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(format!("  {label}"), style)));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!(
            "  {} questions match. No formats checked means all formats.",
            app.pool().len()
        ),
        Style::default().fg(colors.text_dim()),
    )));
    lines.push(Line::from(Span::styled(
        "  [j/k] Move  [Space] Toggle  [Esc] Done",
        Style::default().fg(colors.text_dim()),
    )));

    let block = Block::bordered()
        .title(" Filters ")
        .border_style(Style::default().fg(colors.border_focused()))
        .style(Style::default().bg(colors.bg()));
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}
