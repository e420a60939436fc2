//! Clipboard access through the terminal's OSC 52 escape sequence.

use base64::Engine;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use crate::domain::error::XtuiResult;

pub trait Clipboard: Send {
    fn copy(&mut self, text: &str) -> XtuiResult<()>;
}

/// `ESC ] 52 ; c ; <base64> BEL`
pub fn osc52_sequence(text: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(text.as_bytes());
    format!("\x1b]52;c;{}\x07", encoded)
}

/// Writes the OSC 52 sequence to the terminal, which forwards it to the system clipboard.
pub struct Osc52Clipboard<W: Write + Send> {
    out: W,
}

impl Osc52Clipboard<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write + Send> Osc52Clipboard<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write + Send> Clipboard for Osc52Clipboard<W> {
    fn copy(&mut self, text: &str) -> XtuiResult<()> {
        self.out.write_all(osc52_sequence(text).as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

/// In-process clipboard; clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    contents: Arc<Mutex<Vec<String>>>,
}

impl MemoryClipboard {
    pub fn last(&self) -> Option<String> {
        self.contents.lock().ok().and_then(|c| c.last().cloned())
    }
}

impl Clipboard for MemoryClipboard {
    fn copy(&mut self, text: &str) -> XtuiResult<()> {
        if let Ok(mut contents) = self.contents.lock() {
            contents.push(text.to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_osc52_payload() {
        assert_eq!(osc52_sequence("nginx\tinstalled"), "\x1b]52;c;bmdpbngJaW5zdGFsbGVk\x07");
    }

    #[test]
    fn test_osc52_writer() {
        let mut clipboard = Osc52Clipboard::new(Vec::new());
        clipboard.copy("hi").unwrap();
        assert_eq!(clipboard.out, b"\x1b]52;c;aGk=\x07");
    }

    #[test]
    fn test_memory_clipboard_shares_contents() {
        let clipboard = MemoryClipboard::default();
        let mut writer = clipboard.clone();
        writer.copy("row").unwrap();
        assert_eq!(clipboard.last().as_deref(), Some("row"));
    }
}
