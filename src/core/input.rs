use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// One editing operation on an [`InputBuffer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    Insert(char),
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
    Clear,
}

impl Edit {
    /// Readline-style bindings; `None` for keys that do not edit text.
    pub fn from_key(key: KeyEvent) -> Option<Self> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('u') => Some(Edit::Clear),
                KeyCode::Char('a') => Some(Edit::Home),
                KeyCode::Char('e') => Some(Edit::End),
                _ => None,
            };
        }
        Some(match key.code {
            KeyCode::Char(c) if !c.is_control() => Edit::Insert(c),
            KeyCode::Backspace => Edit::Backspace,
            KeyCode::Delete => Edit::Delete,
            KeyCode::Left => Edit::Left,
            KeyCode::Right => Edit::Right,
            KeyCode::Home => Edit::Home,
            KeyCode::End => Edit::End,
            _ => return None,
        })
    }
}

/// Single-line text editor state. The cursor counts chars, not bytes.
#[derive(Debug, Clone, Default)]
pub struct InputBuffer {
    text: String,
    cursor: usize,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefilled buffer with the cursor after the last char.
    pub fn with_content(content: impl Into<String>) -> Self {
        let text = content.into();
        let cursor = text.chars().count();
        Self { text, cursor }
    }

    /// Apply an editing key. Returns false when the key is not an editing key.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match Edit::from_key(key) {
            Some(edit) => {
                self.apply(edit);
                true
            }
            None => false,
        }
    }

    pub fn apply(&mut self, edit: Edit) {
        let len = self.len();
        match edit {
            Edit::Insert(c) => {
                let at = self.byte_index(self.cursor);
                self.text.insert(at, c);
                self.cursor += 1;
            }
            Edit::Backspace if self.cursor > 0 => {
                self.cursor -= 1;
                let at = self.byte_index(self.cursor);
                self.text.remove(at);
            }
            Edit::Delete if self.cursor < len => {
                let at = self.byte_index(self.cursor);
                self.text.remove(at);
            }
            Edit::Backspace | Edit::Delete => {}
            Edit::Left => self.cursor = self.cursor.saturating_sub(1),
            Edit::Right => self.cursor = (self.cursor + 1).min(len),
            Edit::Home => self.cursor = 0,
            Edit::End => self.cursor = len,
            Edit::Clear => self.clear(),
        }
    }

    pub fn content(&self) -> &str {
        &self.text
    }

    pub fn cursor_position(&self) -> usize {
        self.cursor
    }

    /// Text as it should appear on screen, optionally masked.
    pub fn display(&self, mask: Option<char>) -> String {
        match mask {
            Some(m) => std::iter::repeat(m).take(self.len()).collect(),
            None => self.text.clone(),
        }
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map_or(self.text.len(), |(i, _)| i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(buffer: &mut InputBuffer, text: &str) {
        for c in text.chars() {
            buffer.handle_key(key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn test_insert_and_edit_in_middle() {
        let mut buffer = InputBuffer::new();
        type_str(&mut buffer, "alce");
        buffer.handle_key(key(KeyCode::Left));
        buffer.handle_key(key(KeyCode::Left));
        type_str(&mut buffer, "i");
        assert_eq!(buffer.content(), "alice");
        assert_eq!(buffer.cursor_position(), 3);
    }

    #[test]
    fn test_multibyte_editing() {
        let mut buffer = InputBuffer::with_content("ação");
        assert_eq!(buffer.len(), 4);
        buffer.handle_key(key(KeyCode::Backspace));
        assert_eq!(buffer.content(), "açã");
        buffer.handle_key(key(KeyCode::Home));
        buffer.handle_key(key(KeyCode::Delete));
        assert_eq!(buffer.content(), "çã");
    }

    #[test]
    fn test_key_bindings() {
        assert_eq!(Edit::from_key(key(KeyCode::Char('x'))), Some(Edit::Insert('x')));
        assert_eq!(
            Edit::from_key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL)),
            Some(Edit::Home)
        );
        assert_eq!(Edit::from_key(KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL)), None);
        assert_eq!(Edit::from_key(key(KeyCode::Enter)), None);
    }

    #[test]
    fn test_masked_display() {
        let buffer = InputBuffer::with_content("secret1");
        assert_eq!(buffer.display(Some('•')), "•••••••");
        assert_eq!(buffer.display(None), "secret1");
    }

    #[test]
    fn test_ctrl_u_clears_and_unknown_keys_are_ignored() {
        let mut buffer = InputBuffer::with_content("abc");
        assert!(!buffer.handle_key(key(KeyCode::Tab)));
        assert!(buffer.handle_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL)));
        assert!(buffer.is_empty());
        assert_eq!(buffer.cursor_position(), 0);
    }
}
