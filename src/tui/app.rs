use std::io;
use std::time::Duration;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::event::{Event, EventHandler};
use crate::domain::error::{XtuiError, XtuiResult};

/// Whether the loop keeps running after an update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Everything a screen can receive
#[derive(Debug)]
pub enum ScreenEvent<M> {
    Key(crossterm::event::KeyEvent),
    Resize(u16, u16),
    Tick,
    Message(M),
    /// The message queue closed and drained; sent once.
    InboxClosed,
}

/// A model/update/view screen driven by [`drive`].
pub trait Screen {
    type Message: Send + 'static;

    /// Called once before the first frame.
    fn init(&mut self) -> Flow {
        Flow::Continue
    }

    fn update(&mut self, event: ScreenEvent<Self::Message>) -> Flow;

    fn view(&mut self, frame: &mut Frame);
}

enum Incoming<M> {
    Event(Option<Event>),
    Message(Option<M>),
}

async fn recv_message<M>(messages: &mut Option<mpsc::Receiver<M>>) -> Option<M> {
    match messages {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// Run one screen until it exits. Terminal input is preferred over queued messages.
pub async fn drive<B: Backend, S: Screen>(
    terminal: &mut Terminal<B>,
    screen: &mut S,
    events: &mut EventHandler,
    mut messages: Option<mpsc::Receiver<S::Message>>,
) -> XtuiResult<()> {
    let mut flow = screen.init();

    loop {
        terminal
            .draw(|f| screen.view(f))
            .map_err(XtuiError::terminal)?;
        if flow == Flow::Exit {
            return Ok(());
        }

        let incoming = tokio::select! {
            biased;
            event = events.next() => Incoming::Event(event),
            message = recv_message(&mut messages) => Incoming::Message(message),
        };

        let event = match incoming {
            Incoming::Event(Some(Event::Key(key))) => ScreenEvent::Key(key),
            Incoming::Event(Some(Event::Resize(w, h))) => {
                terminal.autoresize().map_err(XtuiError::terminal)?;
                ScreenEvent::Resize(w, h)
            }
            Incoming::Event(Some(Event::Tick)) => ScreenEvent::Tick,
            Incoming::Event(None) => {
                return Err(XtuiError::Terminal("terminal event stream closed".to_string()));
            }
            Incoming::Message(Some(message)) => ScreenEvent::Message(message),
            Incoming::Message(None) => {
                debug!("Screen message queue closed");
                messages = None;
                ScreenEvent::InboxClosed
            }
        };

        flow = screen.update(event);
    }
}

pub type Tui = Terminal<CrosstermBackend<io::Stdout>>;

/// Owns the real terminal for the lifetime of one screen and restores it on drop.
pub struct App {
    terminal: Tui,
    tick_rate: Duration,
}

impl App {
    pub fn new(tick_rate: Duration) -> XtuiResult<Self> {
        // Setup terminal
        enable_raw_mode().map_err(XtuiError::terminal)?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(XtuiError::terminal(e));
        }
        let backend = CrosstermBackend::new(stdout);
        let terminal = match Terminal::new(backend) {
            Ok(terminal) => terminal,
            Err(e) => {
                restore_terminal();
                return Err(XtuiError::terminal(e));
            }
        };

        Ok(Self {
            terminal,
            tick_rate: tick_rate.max(Duration::from_millis(10)),
        })
    }

    pub async fn run<S: Screen>(
        &mut self,
        screen: &mut S,
        messages: Option<mpsc::Receiver<S::Message>>,
    ) -> XtuiResult<()> {
        let mut events = EventHandler::spawn(self.tick_rate);
        drive(&mut self.terminal, screen, &mut events, messages).await
    }

    pub fn terminal_height(&self) -> Option<u16> {
        self.terminal.size().ok().map(|size| size.height)
    }
}

fn restore_terminal() {
    if let Err(e) = disable_raw_mode() {
        warn!(error = %e, "Failed to disable raw mode");
    }
    if let Err(e) = execute!(io::stdout(), LeaveAlternateScreen) {
        warn!(error = %e, "Failed to leave alternate screen");
    }
}

impl Drop for App {
    fn drop(&mut self) {
        restore_terminal();
        if let Err(e) = self.terminal.show_cursor() {
            warn!(error = %e, "Failed to restore cursor");
        }
    }
}
