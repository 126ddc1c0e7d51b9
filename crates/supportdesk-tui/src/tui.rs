use std::io::{self, Stderr};
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyEvent, KeyEventKind, MouseEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

pub type Tui = Terminal<CrosstermBackend<Stderr>>;

/// Drives the thinking animation, task polling and the copy flag
pub const TICK_RATE: Duration = Duration::from_millis(300);

#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize,
    Tick,
}

/// Map a raw terminal event to what the console reacts to. Key releases and
/// repeats are dropped so Windows terminals don't double every keystroke.
fn translate(event: Event) -> Option<AppEvent> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => Some(AppEvent::Key(key)),
        Event::Mouse(mouse) => Some(AppEvent::Mouse(mouse)),
        Event::Resize(_, _) => Some(AppEvent::Resize),
        _ => None,
    }
}

async fn forward_terminal_events(tx: UnboundedSender<AppEvent>) {
    let mut stream = EventStream::new();
    while let Some(next) = stream.next().await {
        let event = match next {
            Ok(event) => translate(event),
            Err(e) => {
                tracing::warn!(error = %e, "terminal event stream error");
                None
            }
        };
        if let Some(event) = event {
            if tx.send(event).is_err() {
                return;
            }
        }
    }
}

async fn forward_ticks(tx: UnboundedSender<AppEvent>) {
    let mut interval = tokio::time::interval(TICK_RATE);
    loop {
        interval.tick().await;
        if tx.send(AppEvent::Tick).is_err() {
            return;
        }
    }
}

/// Merged stream of terminal input and ticks
pub struct EventHandler {
    rx: UnboundedReceiver<AppEvent>,
}

impl EventHandler {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(forward_terminal_events(tx.clone()));
        tokio::spawn(forward_ticks(tx));
        Self { rx }
    }

    pub async fn next(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }
}

pub fn init() -> Result<Tui> {
    enable_raw_mode()?;
    execute!(io::stderr(), EnterAlternateScreen, EnableMouseCapture)?;
    Ok(Terminal::new(CrosstermBackend::new(io::stderr()))?)
}

pub fn restore() -> Result<()> {
    execute!(io::stderr(), DisableMouseCapture, LeaveAlternateScreen)?;
    disable_raw_mode()?;
    Ok(())
}

/// Leave the alternate screen before the panic message is printed
pub fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = restore();
        previous(info);
    }));
}
