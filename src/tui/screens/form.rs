use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::core::field::FieldCollection;
use crate::core::form::{CursorMode, FormEngine, FormOutcome, FormState};
use crate::tui::app::{Flow, Screen, ScreenEvent};
use crate::tui::event::form_action;
use crate::tui::theme::Theme;

const MASK: char = '•';
const BLINK_TICKS: usize = 5;

pub struct FormScreen {
    engine: FormEngine,
    theme: Theme,
    ticks: usize,
}

impl FormScreen {
    pub fn new(collection: FieldCollection, theme: Theme) -> Self {
        Self {
            engine: FormEngine::new(collection),
            theme,
            ticks: 0,
        }
    }

    pub fn engine(&self) -> &FormEngine {
        &self.engine
    }

    /// `None` only if the loop ended before the form did.
    pub fn into_outcome(mut self) -> Option<FormOutcome> {
        self.engine.outcome()
    }

    fn cursor_visible(&self) -> bool {
        match self.engine.cursor_mode() {
            CursorMode::Blink => (self.ticks / BLINK_TICKS) % 2 == 0,
            CursorMode::Static => true,
            CursorMode::Hidden => false,
        }
    }

    fn render_field(&self, f: &mut Frame, area: Rect, index: usize) {
        let field = &self.engine.fields()[index];
        let input = &self.engine.inputs()[index];
        let focused = index == self.engine.focus_index();
        let style = if focused { self.theme.focused } else { self.theme.blurred };

        let block_width = area.width.saturating_sub(2) as usize;
        let (text, cursor_column) = if input.is_empty() && !focused {
            let placeholder = Span::styled(field.placeholder().to_string(), self.theme.blurred.add_modifier(Modifier::DIM));
            (placeholder, 0)
        } else {
            let mask = field.is_masked().then_some(MASK);
            let (visible, column) = scroll_window(&input.display(mask), input.cursor_position(), block_width);
            (Span::raw(visible), column)
        };

        let mut title = field.placeholder().to_string();
        if field.is_required() {
            title.push_str(" *");
        }
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(style);
        let inner = block.inner(area);
        f.render_widget(Paragraph::new(Line::from(text)).block(block), area);

        if focused && self.cursor_visible() && inner.width > 0 {
            f.set_cursor_position((inner.x + cursor_column as u16, inner.y));
        }
    }
}

/// The slice of `text` that fits in `width` columns with the cursor on screen,
/// plus the cursor column inside that slice. Text scrolls left once the cursor
/// passes the last column.
fn scroll_window(text: &str, cursor: usize, width: usize) -> (String, usize) {
    if width == 0 {
        return (String::new(), 0);
    }
    let start = cursor.saturating_sub(width - 1);
    let visible = text.chars().skip(start).take(width).collect();
    (visible, cursor - start)
}

impl Screen for FormScreen {
    type Message = ();

    fn update(&mut self, event: ScreenEvent<()>) -> Flow {
        match event {
            ScreenEvent::Key(key) => match self.engine.apply(form_action(key)) {
                FormState::Editing => Flow::Continue,
                FormState::Done | FormState::Cancelled => Flow::Exit,
            },
            ScreenEvent::Tick => {
                self.ticks = self.ticks.wrapping_add(1);
                Flow::Continue
            }
            _ => Flow::Continue,
        }
    }

    fn view(&mut self, f: &mut Frame) {
        let count = self.engine.fields().len();
        let mut constraints = vec![Constraint::Length(2)];
        constraints.extend(std::iter::repeat(Constraint::Length(3)).take(count));
        constraints.extend([
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ]);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(f.area());

        f.render_widget(
            Paragraph::new(Span::styled(self.engine.title().to_string(), self.theme.title)),
            chunks[0],
        );

        for index in 0..count {
            self.render_field(f, chunks[index + 1], index);
        }

        let button_style = if self.engine.is_button_focused() {
            self.theme.selected.add_modifier(Modifier::BOLD)
        } else {
            self.theme.blurred
        };
        f.render_widget(
            Paragraph::new(Line::from(vec![Span::raw(" "), Span::styled("[ Submit ]", button_style)])),
            chunks[count + 1],
        );

        if let Some(error) = self.engine.error() {
            f.render_widget(
                Paragraph::new(Span::styled(error.message.clone(), self.theme.error)),
                chunks[count + 2],
            );
        }

        let help = format!(
            "Tab/↓ next • Shift+Tab/↑ previous • Enter submit • Esc cancel • Ctrl+R cursor ({})",
            self.engine.cursor_mode()
        );
        f.render_widget(
            Paragraph::new(Span::styled(help, self.theme.blurred)),
            chunks[count + 3],
        );
    }
}
