//! Screen styles with per-instance overrides.

use ratatui::style::{Color, Modifier, Style};
use std::collections::HashMap;
use std::str::FromStr;
use tracing::debug;

use crate::core::loader::Severity;

#[derive(Debug, Clone)]
pub struct Theme {
    pub focused: Style,
    pub blurred: Style,
    pub error: Style,
    pub header: Style,
    pub row: Style,
    pub selected: Style,
    pub border: Style,
    pub spinner: Style,
    pub title: Style,
    pub success: Style,
    pub warning: Style,
    pub info: Style,
    cells: HashMap<String, Style>,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            focused: Style::default().fg(Color::Rgb(0x01, 0xBE, 0x85)),
            blurred: Style::default().fg(Color::DarkGray),
            error: Style::default().fg(Color::Red),
            header: Style::default()
                .fg(Color::Rgb(0x01, 0xBE, 0x85))
                .add_modifier(Modifier::BOLD),
            row: Style::default().fg(Color::Gray),
            selected: Style::default()
                .fg(Color::Rgb(0x01, 0xBE, 0x85))
                .bg(Color::Rgb(0x00, 0x43, 0x2F)),
            border: Style::default().fg(Color::DarkGray),
            spinner: Style::default().fg(Color::Indexed(215)),
            title: Style::default()
                .fg(Color::Indexed(214))
                .add_modifier(Modifier::BOLD),
            success: Style::default()
                .fg(Color::Indexed(42))
                .add_modifier(Modifier::BOLD),
            warning: Style::default()
                .fg(Color::Indexed(214))
                .add_modifier(Modifier::ITALIC),
            info: Style::default().fg(Color::Indexed(75)),
            cells: HashMap::new(),
        }
    }
}

impl Theme {
    /// Apply `slot = color` overrides. Unknown slots and unparsable colors are skipped.
    pub fn with_overrides(mut self, overrides: &HashMap<String, String>) -> Self {
        for (key, value) in overrides {
            let Ok(color) = Color::from_str(value.trim()) else {
                debug!(key = %key, value = %value, "Ignoring style override with invalid color");
                continue;
            };
            let key = key.trim().to_ascii_lowercase();
            if let Some(cell) = key.strip_prefix("cell.") {
                self.cells.insert(cell.to_string(), Style::default().fg(color));
                continue;
            }
            let slot = match key.as_str() {
                "focused" => &mut self.focused,
                "blurred" => &mut self.blurred,
                "error" => &mut self.error,
                "header" => &mut self.header,
                "row" => &mut self.row,
                "selected" => &mut self.selected,
                "border" => &mut self.border,
                "spinner" => &mut self.spinner,
                "title" => &mut self.title,
                "success" => &mut self.success,
                "warning" => &mut self.warning,
                "info" => &mut self.info,
                _ => {
                    debug!(key = %key, "Ignoring unknown style override");
                    continue;
                }
            };
            *slot = slot.fg(color);
        }
        self
    }

    pub fn severity(&self, severity: Severity) -> Style {
        match severity {
            Severity::Error => self.error,
            Severity::Success => self.success,
            Severity::Warning => self.warning,
            Severity::Info => self.info,
        }
    }

    /// Style for a table cell, matched on the lowercased cell text
    pub fn cell(&self, value: &str) -> Style {
        if self.cells.is_empty() {
            return self.row;
        }
        self.cells
            .get(&value.to_lowercase())
            .copied()
            .unwrap_or(self.row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overrides(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_known_slots_override_foreground() {
        let theme = Theme::default().with_overrides(&overrides(&[("Error", "magenta"), ("selected", "#112233")]));
        assert_eq!(theme.error.fg, Some(Color::Magenta));
        assert_eq!(theme.selected.fg, Some(Color::Rgb(0x11, 0x22, 0x33)));
        assert_eq!(theme.selected.bg, Some(Color::Rgb(0x00, 0x43, 0x2F)));
    }

    #[test]
    fn test_unknown_and_invalid_overrides_are_ignored() {
        let default = Theme::default();
        let theme = Theme::default().with_overrides(&overrides(&[("sparkles", "red"), ("header", "nope")]));
        assert_eq!(theme.header, default.header);
    }

    #[test]
    fn test_cell_overrides() {
        let theme = Theme::default().with_overrides(&overrides(&[("cell.residual", "yellow")]));
        assert_eq!(theme.cell("Residual").fg, Some(Color::Yellow));
        assert_eq!(theme.cell("installed"), theme.row);
    }

    #[test]
    fn test_severity_styles() {
        let theme = Theme::default();
        assert_eq!(theme.severity(Severity::Error), theme.error);
        assert_eq!(theme.severity(Severity::Info), theme.info);
    }
}
