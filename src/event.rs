use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};

pub enum AppEvent {
    /// Key press with the time it was read from the terminal.
    Key(KeyEvent, Instant),
    /// Poll timeout with nothing to read; carries the time it was observed.
    Tick(Instant),
    Resize,
}

/// Terminal input pump. Key presses are forwarded as they arrive; an idle
/// poll produces a `Tick` so the reveal and countdown timers keep moving.
pub struct EventHandler {
    rx: mpsc::Receiver<AppEvent>,
    _tx: mpsc::Sender<AppEvent>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        let _tx = tx.clone();

        thread::spawn(move || {
            loop {
                let event = if event::poll(tick_rate).unwrap_or(false) {
                    match event::read() {
                        Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                            AppEvent::Key(key, Instant::now())
                        }
                        Ok(Event::Resize(_, _)) => AppEvent::Resize,
                        _ => continue,
                    }
                } else {
                    AppEvent::Tick(Instant::now())
                };
                if tx.send(event).is_err() {
                    return;
                }
            }
        });

        Self { rx, _tx }
    }

    pub fn next(&self) -> anyhow::Result<AppEvent> {
        Ok(self.rx.recv()?)
    }
}
