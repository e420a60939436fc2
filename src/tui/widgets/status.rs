use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Bottom status line: left-aligned segments separated by ` | `
pub fn render_status_bar(f: &mut Frame, area: Rect, segments: &[String], style: Style) {
    let mut spans = Vec::with_capacity(segments.len() * 2);
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", style));
        }
        spans.push(Span::styled(segment.clone(), style));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
