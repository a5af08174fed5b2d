use crate::error::{Pic2TextError, Result};

pub trait ClipboardPort: Send + Sync {
    fn write_text(&self, text: &str) -> Result<()>;
}

/// The operating system clipboard.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl SystemClipboard {
    pub fn new() -> Self {
        Self
    }
}

impl ClipboardPort for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<()> {
        let mut clipboard = arboard::Clipboard::new()
            .map_err(|e| Pic2TextError::Clipboard(format!("Clipboard unavailable: {e}")))?;
        clipboard
            .set_text(text.to_owned())
            .map_err(|e| Pic2TextError::Clipboard(format!("Failed to write clipboard: {e}")))
    }
}
