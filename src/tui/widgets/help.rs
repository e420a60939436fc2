use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::tui::{theme::Theme, ui::centered_rect};

/// Shortcut legend drawn over the screen
pub fn render_help_popup(f: &mut Frame, area: Rect, shortcuts: &[(&str, &str)], theme: &Theme) {
    let popup_area = centered_rect(70, 80, area);

    // Clear the background
    f.render_widget(Clear, popup_area);

    let width = shortcuts.iter().map(|(keys, _)| keys.len()).max().unwrap_or(0);
    let mut content = vec![Line::from(Span::styled(
        "Shortcuts",
        theme.title.add_modifier(Modifier::UNDERLINED),
    ))];
    content.push(Line::from(""));
    content.extend(shortcuts.iter().map(|(keys, action)| {
        Line::from(vec![
            Span::styled(format!("  {:<width$}", keys, width = width), theme.focused),
            Span::raw("  "),
            Span::raw(*action),
        ])
    }));

    let help = Paragraph::new(content)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help")
                .border_style(theme.warning.remove_modifier(Modifier::ITALIC)),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(help, popup_area);
}

/// One-line hint with the key that toggles the legend
pub fn help_hint(key: &str) -> Line<'static> {
    Line::from(Span::styled(
        format!("Press {} to show/hide shortcuts.", key),
        Style::default().add_modifier(Modifier::DIM),
    ))
}
