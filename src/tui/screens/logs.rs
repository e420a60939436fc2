use std::collections::HashMap;
use std::str::FromStr;

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tracing::debug;

use crate::core::logview::SharedLogBuffer;
use crate::tui::app::{Flow, Screen, ScreenEvent};
use crate::tui::theme::Theme;

/// Tail view over a buffer filled by background producers.
pub struct LogScreen {
    buffer: SharedLogBuffer,
    theme: Theme,
    modules: Vec<(String, Style)>,
}

impl LogScreen {
    pub fn new(buffer: SharedLogBuffer, theme: Theme) -> Self {
        Self {
            buffer,
            theme,
            modules: Vec::new(),
        }
    }

    /// `module -> color` pairs; unknown colors are skipped.
    pub fn with_module_colors(mut self, colors: &HashMap<String, String>) -> Self {
        let mut modules: Vec<(String, Style)> = colors
            .iter()
            .filter(|(module, _)| !module.is_empty())
            .filter_map(|(module, color)| match Color::from_str(color) {
                Ok(color) => Some((module.clone(), Style::default().fg(color))),
                Err(_) => {
                    debug!(module = %module, color = %color, "Ignoring unknown module color");
                    None
                }
            })
            .collect();
        // Longer names first so "net" never shadows "netlink".
        modules.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));
        self.modules = modules;
        self
    }

    pub fn buffer(&self) -> &SharedLogBuffer {
        &self.buffer
    }

    /// Split `line` into spans, coloring every module name occurrence.
    pub fn highlight<'a>(&self, line: &'a str) -> Line<'a> {
        let mut spans = Vec::new();
        let mut rest = line;
        while !rest.is_empty() {
            let next = self
                .modules
                .iter()
                .filter_map(|(module, style)| rest.find(module.as_str()).map(|at| (at, module, *style)))
                .min_by_key(|(at, _, _)| *at);
            match next {
                Some((at, module, style)) => {
                    if at > 0 {
                        spans.push(Span::styled(&rest[..at], self.theme.row));
                    }
                    spans.push(Span::styled(&rest[at..at + module.len()], style));
                    rest = &rest[at + module.len()..];
                }
                None => {
                    spans.push(Span::styled(rest, self.theme.row));
                    break;
                }
            }
        }
        Line::from(spans)
    }
}

impl Screen for LogScreen {
    type Message = ();

    fn update(&mut self, event: ScreenEvent<()>) -> Flow {
        let ScreenEvent::Key(key) = event else {
            return Flow::Continue;
        };
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Flow::Exit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Flow::Exit,
            KeyCode::Up => {
                self.buffer.lock().scroll_up();
                Flow::Continue
            }
            KeyCode::Down => {
                self.buffer.lock().scroll_down();
                Flow::Continue
            }
            _ => Flow::Continue,
        }
    }

    fn view(&mut self, f: &mut Frame) {
        // Copy out under the lock; producers keep running while we draw.
        let (tree, lines, auto) = {
            let buffer = self.buffer.lock();
            let tree = buffer.tree().to_string();
            let height = f.area().height as usize;
            let lines: Vec<String> = buffer.window(height).into_iter().map(str::to_string).collect();
            (tree, lines, buffer.is_auto_scroll())
        };

        let tree_height = if tree.is_empty() { 0 } else { tree.lines().count() as u16 + 2 };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Max(tree_height),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(f.area());

        if tree_height > 0 {
            let block = Block::default()
                .borders(Borders::ALL)
                .title(Span::styled("Log files", self.theme.title))
                .border_style(self.theme.border);
            f.render_widget(Paragraph::new(tree).block(block), chunks[0]);
        }

        let inner_height = chunks[1].height.saturating_sub(2) as usize;
        let skip = lines.len().saturating_sub(inner_height);
        let rendered: Vec<Line> = lines[skip..].iter().map(|line| self.highlight(line)).collect();
        let block = Block::default()
            .borders(Borders::ALL)
            .title(Span::styled("Logs", self.theme.title))
            .border_style(self.theme.border);
        f.render_widget(Paragraph::new(rendered).block(block), chunks[1]);

        let mode = if auto { "following" } else { "paused" };
        let hint = format!("↑/↓ scroll • q quit • {}", mode);
        f.render_widget(Paragraph::new(Span::styled(hint, self.theme.blurred)), chunks[2]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::app::drive;
    use crate::tui::event::{Event, EventHandler};
    use crossterm::event::KeyEvent;
    use ratatui::{backend::TestBackend, Terminal};

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn screen_with_lines(count: usize) -> LogScreen {
        let buffer = SharedLogBuffer::default();
        {
            let mut guard = buffer.lock();
            for i in 0..count {
                guard.push(format!("[net] line {}", i));
            }
            guard.set_tree("/var/log\n└── [4.0K]  app.log");
        }
        LogScreen::new(buffer, Theme::default())
    }

    #[test]
    fn test_highlight_splits_module_names() {
        let mut colors = HashMap::new();
        colors.insert("net".to_string(), "red".to_string());
        colors.insert("disk".to_string(), "not-a-color".to_string());
        let screen = screen_with_lines(0).with_module_colors(&colors);

        let line = screen.highlight("[net] up, net ok");
        let parts: Vec<&str> = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(parts, vec!["[", "net", "] up, ", "net", " ok"]);
        assert_eq!(line.spans[1].style.fg, Some(Color::Red));
        assert_eq!(screen.modules.len(), 1);
    }

    #[tokio::test]
    async fn test_scroll_then_quit() {
        let mut screen = screen_with_lines(30);
        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        let mut events = EventHandler::scripted(vec![key(KeyCode::Up), key(KeyCode::Up), key(KeyCode::Char('q'))]);

        drive(&mut terminal, &mut screen, &mut events, None).await.unwrap();

        let buffer = screen.buffer().lock();
        assert_eq!(buffer.scroll_offset(), 27);
        assert!(!buffer.is_auto_scroll());
        drop(buffer);

        let text: String = terminal.backend().buffer().content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("app.log"));
        assert!(text.contains("line 27"));
        assert!(!text.contains("line 29"));
        assert!(text.contains("paused"));
    }
}
