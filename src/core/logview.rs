//! Scrollable tail buffer shared between log producers and the log screen.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

pub const MAX_LOG_LINES: usize = 100;

#[derive(Debug, Clone)]
pub struct LogBuffer {
    lines: VecDeque<String>,
    capacity: usize,
    scroll_offset: usize,
    auto_scroll: bool,
    tree: String,
}

impl LogBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            capacity: capacity.max(1),
            scroll_offset: 0,
            auto_scroll: true,
            tree: String::new(),
        }
    }

    pub fn push(&mut self, line: impl Into<String>) {
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
            self.scroll_offset = self.scroll_offset.saturating_sub(1);
        }
        self.lines.push_back(line.into());
        if self.auto_scroll {
            self.scroll_offset = self.lines.len().saturating_sub(1);
        }
    }

    pub fn scroll_up(&mut self) {
        if self.scroll_offset > 0 {
            self.scroll_offset -= 1;
            self.auto_scroll = false;
        }
    }

    /// Reaching the last line re-enables auto-scroll.
    pub fn scroll_down(&mut self) {
        if self.scroll_offset + 1 < self.lines.len() {
            self.scroll_offset += 1;
            if self.scroll_offset + 1 == self.lines.len() {
                self.auto_scroll = true;
            }
        }
    }

    pub fn set_tree(&mut self, tree: impl Into<String>) {
        self.tree = tree.into();
    }

    pub fn tree(&self) -> &str {
        &self.tree
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn is_auto_scroll(&self) -> bool {
        self.auto_scroll
    }

    /// Up to `height` lines ending at the scroll position.
    pub fn window(&self, height: usize) -> Vec<&str> {
        if self.lines.is_empty() || height == 0 {
            return Vec::new();
        }
        let end = (self.scroll_offset + 1).min(self.lines.len());
        let start = end.saturating_sub(height);
        self.lines.range(start..end).map(String::as_str).collect()
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new(MAX_LOG_LINES)
    }
}

/// The single lock guarding lines and tree text.
#[derive(Debug, Clone, Default)]
pub struct SharedLogBuffer {
    inner: Arc<Mutex<LogBuffer>>,
}

impl SharedLogBuffer {
    pub fn new(buffer: LogBuffer) -> Self {
        Self {
            inner: Arc::new(Mutex::new(buffer)),
        }
    }

    /// A poisoned lock only means a producer panicked mid-push; the buffer is still usable.
    pub fn lock(&self) -> MutexGuard<'_, LogBuffer> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
