use std::path::PathBuf;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};
use tracing::{error, info, warn};

use crate::core::table::{export, ExportFormat, ExportStatus, TableView, SCREEN_CHROME_LINES};
use crate::infrastructure::clipboard::Clipboard;
use crate::tui::app::{Flow, Screen, ScreenEvent};
use crate::tui::event::{table_action, TableAction, TABLE_SHORTCUTS};
use crate::tui::theme::Theme;
use crate::tui::ui::truncate;
use crate::tui::widgets::help::{help_hint, render_help_popup};
use crate::tui::widgets::status::render_status_bar;

pub struct TableScreen {
    title: String,
    view: TableView,
    theme: Theme,
    clipboard: Box<dyn Clipboard>,
    export_dir: PathBuf,
    /// Follow the terminal height when no page size was configured
    auto_page_size: bool,
}

impl TableScreen {
    pub fn new(title: impl Into<String>, view: TableView, theme: Theme, clipboard: Box<dyn Clipboard>) -> Self {
        Self {
            title: title.into(),
            view,
            theme,
            clipboard,
            export_dir: PathBuf::from("."),
            auto_page_size: false,
        }
    }

    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = dir.into();
        self
    }

    pub fn with_auto_page_size(mut self, auto: bool) -> Self {
        self.auto_page_size = auto;
        self
    }

    pub fn view_state(&self) -> &TableView {
        &self.view
    }

    pub fn apply(&mut self, action: TableAction) -> Flow {
        match action {
            TableAction::FilterChar(c) => self.view.push_filter_char(c),
            TableAction::FilterBackspace => self.view.pop_filter_char(),
            TableAction::ToggleSort => self.view.toggle_sort(),
            TableAction::NextPage => {
                self.view.next_page();
            }
            TableAction::PrevPage => {
                self.view.prev_page();
            }
            TableAction::SelectNext => self.view.select_next(),
            TableAction::SelectPrev => self.view.select_prev(),
            TableAction::Copy => self.copy_selected(),
            TableAction::ClearSelection => self.view.clear_selection(),
            TableAction::Export(format) => self.export(format),
            TableAction::ToggleColumns => self.view.toggle_columns(),
            TableAction::ToggleHelp => self.view.toggle_help(),
            TableAction::Quit => return Flow::Exit,
        }
        Flow::Continue
    }

    fn copy_selected(&mut self) {
        self.view.apply_filter();
        let Some(row) = self.view.selected_row() else {
            return;
        };
        let text = row.join("\t");
        match self.clipboard.copy(&text) {
            Ok(()) => info!(cells = row.len(), "Copied row to clipboard"),
            Err(e) => warn!(error = %e, "Failed to copy row to clipboard"),
        }
    }

    /// Export failures are logged and never end the screen.
    fn export(&mut self, format: ExportFormat) {
        let path = self.export_dir.join(format.default_filename());
        let rows = self.view.filtered_rows();
        match export(format, self.view.headers(), &rows, &path) {
            Ok(ExportStatus::Written(path)) => {
                info!(format = %format, path = %path.display(), rows = rows.len(), "Exported table")
            }
            Ok(ExportStatus::Unsupported(format)) => {
                info!(format = %format, "Export format not supported, nothing written")
            }
            Err(e) => error!(error = %e, path = %path.display(), "Error exporting table"),
        }
    }

    fn render_table(&self, f: &mut Frame, area: ratatui::layout::Rect) {
        let columns = self.view.visible_columns();
        let block = Block::default()
            .borders(Borders::ALL)
            .title(Span::styled(self.title.clone(), self.theme.title))
            .border_style(self.theme.border);

        if columns.is_empty() {
            let hidden = Paragraph::new(Span::styled("All columns hidden (Ctrl+T to show)", self.theme.blurred))
                .block(block);
            f.render_widget(hidden, area);
            return;
        }

        let headers = self.view.headers();
        let header = Row::new(columns.iter().map(|&c| Cell::from(headers[c].clone()))).style(self.theme.header);

        // Fill(1) splits the inner width evenly; cut long cells with an ellipsis
        let spacing = 2 * (columns.len() as u16 - 1);
        let cell_width = (area.width.saturating_sub(2 + spacing) / columns.len() as u16) as usize;

        let offset = self.view.page_offset();
        let selected = self.view.selected();
        let rows = self.view.current_page_rows().into_iter().enumerate().map(|(i, row)| {
            let cells = columns
                .iter()
                .map(|&c| Cell::from(truncate(&row[c], cell_width)).style(self.theme.cell(&row[c])));
            let row = Row::new(cells);
            if selected == Some(offset + i) {
                row.style(self.theme.selected)
            } else {
                row
            }
        });

        let widths = vec![Constraint::Fill(1); columns.len()];
        let table = Table::new(rows, widths).header(header).block(block).column_spacing(2);
        f.render_widget(table, area);
    }
}

/// Rows that fit on one page at terminal height `height`.
pub fn rows_for_height(height: u16) -> usize {
    (height as usize).saturating_sub(SCREEN_CHROME_LINES).max(1)
}

impl Screen for TableScreen {
    type Message = ();

    fn update(&mut self, event: ScreenEvent<()>) -> Flow {
        match event {
            ScreenEvent::Key(key) => match table_action(key) {
                Some(action) => self.apply(action),
                None => Flow::Continue,
            },
            ScreenEvent::Resize(_, height) if self.auto_page_size => {
                self.view.set_page_size(rows_for_height(height));
                Flow::Continue
            }
            _ => Flow::Continue,
        }
    }

    fn view(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Filter
                Constraint::Min(3),    // Table
                Constraint::Length(1), // Page
                Constraint::Length(1), // Hint
            ])
            .split(f.area());

        let filter = Line::from(vec![
            Span::styled("Filter: ", self.theme.focused.add_modifier(Modifier::BOLD)),
            Span::raw(self.view.filter().to_string()),
        ]);
        f.render_widget(Paragraph::new(filter), chunks[0]);

        self.render_table(f, chunks[1]);

        let mut segments = vec![
            format!("Page: {}/{}", self.view.page() + 1, self.view.page_count()),
            format!("Rows: {}/{}", self.view.filtered_len(), self.view.total_rows()),
        ];
        if let Some(column) = self.view.sort_column() {
            let direction = if self.view.is_ascending() { "asc" } else { "desc" };
            segments.push(format!("Sort: {} {}", self.view.headers()[column], direction));
        }
        render_status_bar(f, chunks[2], &segments, self.theme.row);
        f.render_widget(Paragraph::new(help_hint("Ctrl+G")), chunks[3]);

        if self.view.show_help() {
            render_help_popup(f, f.area(), TABLE_SHORTCUTS, &self.theme);
        }
    }
}
