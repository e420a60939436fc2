use std::sync::Arc;

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    text::{Line, Span},
    widgets::{Gauge, Paragraph},
    Frame,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::core::installer::{InstallReport, InstallStep, InstallerState, PackageManager};
use crate::core::loader::SpinnerKind;
use crate::domain::error::{XtuiError, XtuiResult};
use crate::tui::app::{Flow, Screen, ScreenEvent};
use crate::tui::theme::Theme;
use crate::tui::widgets::spinner::Spinner;

/// Completion of one install, carrying the package name
pub type InstallMessage = XtuiResult<String>;

pub struct InstallerScreen {
    state: InstallerState,
    manager: Arc<dyn PackageManager>,
    tx: mpsc::Sender<InstallMessage>,
    task: Option<JoinHandle<()>>,
    spinner: Spinner,
    theme: Theme,
    cancelled: bool,
    failure: Option<XtuiError>,
}

impl InstallerScreen {
    pub fn new(
        state: InstallerState,
        manager: Arc<dyn PackageManager>,
        theme: Theme,
    ) -> (Self, mpsc::Receiver<InstallMessage>) {
        let (tx, rx) = mpsc::channel(1);
        let screen = Self {
            state,
            manager,
            tx,
            task: None,
            spinner: Spinner::new(SpinnerKind::Dots),
            theme,
            cancelled: false,
            failure: None,
        };
        (screen, rx)
    }

    pub fn state(&self) -> &InstallerState {
        &self.state
    }

    /// Fail-fast: the first install error becomes the result.
    pub fn into_result(mut self) -> XtuiResult<InstallReport> {
        if let Some(err) = self.failure.take() {
            return Err(err);
        }
        Ok(self.state.report(self.cancelled))
    }

    fn dispatch(&mut self, package: String) {
        let manager = Arc::clone(&self.manager);
        let tx = self.tx.clone();
        debug!(app = %package, manager = manager.name(), "Dispatching install");
        self.task = Some(tokio::spawn(async move {
            let result = manager.install(&package).await.map(|()| package);
            let _ = tx.send(result).await;
        }));
    }

    fn abort(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for InstallerScreen {
    fn drop(&mut self) {
        self.abort();
    }
}

impl Screen for InstallerScreen {
    type Message = InstallMessage;

    fn init(&mut self) -> Flow {
        if let Some(package) = self.state.current().map(str::to_string) {
            self.dispatch(package);
        }
        Flow::Continue
    }

    fn update(&mut self, event: ScreenEvent<InstallMessage>) -> Flow {
        match event {
            ScreenEvent::Key(key) => {
                let interrupt = matches!(key.code, KeyCode::Esc | KeyCode::Char('q'))
                    || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL));
                if interrupt {
                    info!(installed = self.state.installed().len(), "Installation cancelled");
                    self.cancelled = true;
                    self.abort();
                    return Flow::Exit;
                }
                Flow::Continue
            }
            ScreenEvent::Message(Ok(package)) => {
                info!(app = %package, "Application installed");
                match self.state.on_installed() {
                    InstallStep::Next(next) => {
                        self.dispatch(next);
                        Flow::Continue
                    }
                    InstallStep::Done => Flow::Exit,
                }
            }
            ScreenEvent::Message(Err(err)) => {
                self.failure = Some(err);
                Flow::Exit
            }
            ScreenEvent::Tick => {
                self.spinner.tick();
                Flow::Continue
            }
            ScreenEvent::Resize(..) | ScreenEvent::InboxClosed => Flow::Continue,
        }
    }

    fn view(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Min(0)])
            .split(f.area());

        let total = self.state.total();
        let width = total.to_string().len();
        let count = format!(" {:>w$}/{:>w$}", self.state.index() + 1, total, w = width);

        let header = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(31), Constraint::Fill(1), Constraint::Length(count.len() as u16)])
            .split(chunks[0]);
        f.render_widget(
            Paragraph::new(Line::from(vec![
                Span::raw("[pkgz] "),
                Span::styled("Installation progress: ", self.theme.info),
            ])),
            header[0],
        );
        f.render_widget(
            Gauge::default()
                .gauge_style(self.theme.warning)
                .ratio(self.state.progress())
                .label(""),
            header[1],
        );
        f.render_widget(Paragraph::new(count), header[2]);

        let mut lines: Vec<Line> = self
            .state
            .installed()
            .iter()
            .map(|package| {
                Line::from(vec![
                    Span::raw("[pkgz] "),
                    Span::styled("Installed application: ", self.theme.info),
                    Span::styled("✓ ", self.theme.success),
                    Span::styled(package.clone(), self.theme.warning),
                ])
            })
            .collect();

        if let Some(current) = self.state.current() {
            if self.failure.is_none() && !self.cancelled {
                lines.push(Line::from(vec![
                    self.spinner.span(self.theme.spinner),
                    Span::raw(format!(" Installing {}...", current)),
                ]));
            }
        }
        if let Some(err) = &self.failure {
            lines.push(Line::from(Span::styled(err.to_string(), self.theme.error)));
        }
        if self.state.is_done() {
            lines.push(Line::from(vec![
                Span::raw("[pkgz] Done! Installed "),
                Span::styled(total.to_string(), self.theme.info),
                Span::raw(" applications."),
            ]));
        }
        f.render_widget(Paragraph::new(lines), chunks[2]);
    }
}
