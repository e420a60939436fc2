use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::Modifier,
    text::{Line, Span},
    widgets::{Gauge, Paragraph},
    Frame,
};
use tracing::debug;

use crate::core::loader::{LoaderEvent, LoaderExit, LoaderLog, SpinnerKind};
use crate::tui::app::{Flow, Screen, ScreenEvent};
use crate::tui::theme::Theme;
use crate::tui::widgets::spinner::Spinner;

pub struct LoaderScreen {
    log: LoaderLog,
    spinner: Spinner,
    theme: Theme,
    exit: Option<LoaderExit>,
}

impl LoaderScreen {
    pub fn new(max_messages: usize, spinner: SpinnerKind, theme: Theme) -> Self {
        Self {
            log: LoaderLog::new(max_messages),
            spinner: Spinner::new(spinner),
            theme,
            exit: None,
        }
    }

    pub fn log(&self) -> &LoaderLog {
        &self.log
    }

    pub fn exit(&self) -> Option<LoaderExit> {
        self.exit
    }
}

impl Screen for LoaderScreen {
    type Message = LoaderEvent;

    fn update(&mut self, event: ScreenEvent<LoaderEvent>) -> Flow {
        match event {
            ScreenEvent::Key(_) => {
                debug!("Loader interrupted by keystroke");
                self.exit = Some(LoaderExit::Interrupted);
                Flow::Exit
            }
            ScreenEvent::Message(event) => {
                self.log.apply(event);
                Flow::Continue
            }
            ScreenEvent::InboxClosed => {
                self.exit = Some(LoaderExit::Completed);
                Flow::Exit
            }
            ScreenEvent::Tick => {
                self.spinner.tick();
                Flow::Continue
            }
            ScreenEvent::Resize(..) => Flow::Continue,
        }
    }

    fn view(&mut self, f: &mut Frame) {
        let progress = self.log.progress();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(if progress.is_some() { 2 } else { 0 }),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(f.area());

        let title = match self.exit {
            Some(LoaderExit::Completed) => Line::from(Span::styled("Done!", self.theme.title)),
            Some(LoaderExit::Interrupted) => Line::from(Span::styled("Interrupted", self.theme.warning)),
            None => Line::from(vec![
                self.spinner.span(self.theme.spinner),
                Span::styled(" Working...", self.theme.title),
            ]),
        };
        f.render_widget(Paragraph::new(title), chunks[0]);

        if let Some((ratio, label)) = progress {
            let gauge = Gauge::default()
                .gauge_style(self.theme.spinner)
                .ratio(ratio)
                .label(label.to_string());
            f.render_widget(gauge, chunks[1]);
        }

        // Newest messages stay visible when the log outgrows the area.
        let height = chunks[2].height as usize;
        let skip = self.log.len().saturating_sub(height);
        let lines: Vec<Line> = self
            .log
            .entries()
            .skip(skip)
            .map(|entry| Line::from(Span::styled(entry.text.clone(), self.theme.severity(entry.severity))))
            .collect();
        f.render_widget(Paragraph::new(lines), chunks[2]);

        if self.exit.is_none() {
            f.render_widget(
                Paragraph::new(Span::styled(
                    "Press any key to quit",
                    self.theme.blurred.add_modifier(Modifier::DIM),
                )),
                chunks[3],
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::loader::{channel, Severity};
    use crate::tui::app::drive;
    use crate::tui::event::{Event, EventHandler};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::{backend::TestBackend, Terminal};

    #[tokio::test]
    async fn test_loader_completes_when_queue_closes() {
        let mut terminal = Terminal::new(TestBackend::new(50, 12)).unwrap();
        let mut screen = LoaderScreen::new(100, SpinnerKind::Dots, Theme::default());
        let mut events = EventHandler::scripted(Vec::new());
        let (handle, inbox) = channel(2);

        let producer = tokio::spawn(async move {
            handle.message("Fetching index").await.unwrap();
            handle.progress(1, 2, "packages").await.unwrap();
            handle.message("Warning: slow mirror").await.unwrap();
            handle.message("Success: done").await.unwrap();
            handle.close();
        });

        drive(&mut terminal, &mut screen, &mut events, Some(inbox.into_receiver()))
            .await
            .unwrap();
        producer.await.unwrap();

        assert_eq!(screen.exit(), Some(LoaderExit::Completed));
        let severities: Vec<Severity> = screen.log().entries().map(|e| e.severity).collect();
        assert_eq!(severities, vec![Severity::Info, Severity::Warning, Severity::Success]);

        let text: String = terminal.backend().buffer().content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Done!"));
        assert!(text.contains("Success: done"));
    }

    #[tokio::test]
    async fn test_any_key_interrupts() {
        let mut terminal = Terminal::new(TestBackend::new(50, 8)).unwrap();
        let mut screen = LoaderScreen::new(100, SpinnerKind::Line, Theme::default());
        let mut events = EventHandler::scripted(vec![
            Event::Tick,
            Event::Key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE)),
        ]);
        let (_handle, inbox) = channel(4);

        drive(&mut terminal, &mut screen, &mut events, Some(inbox.into_receiver()))
            .await
            .unwrap();

        assert_eq!(screen.exit(), Some(LoaderExit::Interrupted));
        let text: String = terminal.backend().buffer().content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Interrupted"));
        assert!(!text.contains("Done!"));
    }
}
