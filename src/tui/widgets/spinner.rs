use ratatui::{style::Style, text::Span};

use crate::core::loader::SpinnerKind;

/// Frame counter advanced on every tick
#[derive(Debug, Clone, Default)]
pub struct Spinner {
    kind: SpinnerKind,
    tick: usize,
}

impl Spinner {
    pub fn new(kind: SpinnerKind) -> Self {
        Self { kind, tick: 0 }
    }

    pub fn tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    pub fn frame(&self) -> &'static str {
        self.kind.frame(self.tick)
    }

    pub fn span(&self, style: Style) -> Span<'static> {
        Span::styled(self.frame(), style)
    }
}
