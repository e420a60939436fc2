use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

use crate::core::form::FormAction;
use crate::core::table::ExportFormat;

/// Terminal events delivered to a screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    Resize(u16, u16),
    Tick,
}

/// Event handler that polls the terminal on a blocking thread
pub struct EventHandler {
    receiver: mpsc::UnboundedReceiver<Event>,
    // Scripted handlers keep their sender so the stream pends instead of ending.
    _sender: Option<mpsc::UnboundedSender<Event>>,
}

impl EventHandler {
    /// Start polling crossterm; a `Tick` is sent whenever `tick_rate` passes without input.
    pub fn spawn(tick_rate: Duration) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        tokio::task::spawn_blocking(move || loop {
            let event = match event::poll(tick_rate) {
                Ok(true) => match event::read() {
                    Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => Event::Key(key),
                    Ok(CrosstermEvent::Resize(w, h)) => Event::Resize(w, h),
                    Ok(_) => continue,
                    Err(e) => {
                        debug!(error = %e, "Terminal event read failed");
                        break;
                    }
                },
                Ok(false) => Event::Tick,
                Err(e) => {
                    debug!(error = %e, "Terminal event poll failed");
                    break;
                }
            };
            if sender.send(event).is_err() {
                break;
            }
        });
        Self {
            receiver,
            _sender: None,
        }
    }

    /// Replay a fixed list of events, then wait forever.
    pub fn scripted(events: impl IntoIterator<Item = Event>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        for event in events {
            // The receiver is alive, so this cannot fail.
            let _ = sender.send(event);
        }
        Self {
            receiver,
            _sender: Some(sender),
        }
    }

    /// Receive the next event
    pub async fn next(&mut self) -> Option<Event> {
        self.receiver.recv().await
    }
}

fn is_ctrl(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL)
}

/// Form key bindings
pub fn form_action(key: KeyEvent) -> FormAction {
    match key.code {
        KeyCode::Char('c') if is_ctrl(&key) => FormAction::Cancel,
        KeyCode::Char('r') if is_ctrl(&key) => FormAction::CycleCursor,
        KeyCode::Esc => FormAction::Cancel,
        KeyCode::Down | KeyCode::Tab => FormAction::Next,
        KeyCode::Up | KeyCode::BackTab => FormAction::Prev,
        KeyCode::Enter => FormAction::Confirm,
        _ => FormAction::Edit(key),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableAction {
    FilterChar(char),
    FilterBackspace,
    ToggleSort,
    NextPage,
    PrevPage,
    SelectNext,
    SelectPrev,
    Copy,
    ClearSelection,
    Export(ExportFormat),
    ToggleColumns,
    ToggleHelp,
    Quit,
}

/// Table key bindings. Unbound control keys map to nothing.
pub fn table_action(key: KeyEvent) -> Option<TableAction> {
    if is_ctrl(&key) {
        let KeyCode::Char(c) = key.code else {
            return None;
        };
        return match c.to_ascii_lowercase() {
            'q' | 'c' => Some(TableAction::Quit),
            'o' => Some(TableAction::ToggleSort),
            'e' => Some(TableAction::Export(ExportFormat::Csv)),
            'y' => Some(TableAction::Export(ExportFormat::Yaml)),
            's' => Some(TableAction::Export(ExportFormat::Json)),
            'x' => Some(TableAction::Export(ExportFormat::Xml)),
            'l' => Some(TableAction::Export(ExportFormat::Excel)),
            'p' => Some(TableAction::Export(ExportFormat::Pdf)),
            'd' => Some(TableAction::Export(ExportFormat::Markdown)),
            't' => Some(TableAction::ToggleColumns),
            'g' => Some(TableAction::ToggleHelp),
            _ => None,
        };
    }
    if key.modifiers.contains(KeyModifiers::ALT) {
        return None;
    }

    match key.code {
        KeyCode::Char(c) => Some(TableAction::FilterChar(c)),
        KeyCode::Backspace => Some(TableAction::FilterBackspace),
        KeyCode::Right => Some(TableAction::NextPage),
        KeyCode::Left => Some(TableAction::PrevPage),
        KeyCode::Down => Some(TableAction::SelectNext),
        KeyCode::Up => Some(TableAction::SelectPrev),
        KeyCode::Enter => Some(TableAction::Copy),
        KeyCode::Esc => Some(TableAction::ClearSelection),
        _ => None,
    }
}

/// Key legend shown by the table help panel
pub const TABLE_SHORTCUTS: &[(&str, &str)] = &[
    ("Ctrl+Q, Ctrl+C", "Quit"),
    ("Enter", "Copy selected row to the clipboard"),
    ("Esc", "Clear selection"),
    ("Backspace", "Remove last filter character"),
    ("Ctrl+O", "Toggle sort"),
    ("Right / Left", "Next / previous page"),
    ("Down / Up", "Select next / previous row"),
    ("Ctrl+E", "Export to CSV"),
    ("Ctrl+Y", "Export to YAML"),
    ("Ctrl+S", "Export to JSON"),
    ("Ctrl+X", "Export to XML"),
    ("Ctrl+L", "Export to Excel"),
    ("Ctrl+P", "Export to PDF"),
    ("Ctrl+D", "Export to Markdown"),
    ("Ctrl+T", "Toggle column visibility"),
    ("Ctrl+G", "Show / hide shortcuts"),
];
