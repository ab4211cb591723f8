//! System clipboard access for the copy commands.

use crate::error::{Error, Result};

/// Set-only clipboard abstraction.
///
/// The chat commands write to the clipboard but never read it; tests
/// substitute an in-memory implementation.
pub trait Clipboard {
    /// Replace the clipboard contents with `text`.
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// Clipboard backed by the operating system via arboard.
///
/// The underlying clipboard handle is opened per call, so a headless
/// environment fails the individual copy operation instead of startup.
pub struct SystemClipboard;

impl SystemClipboard {
    /// Creates a new SystemClipboard.
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        let mut clipboard = arboard::Clipboard::new()
            .map_err(|e| Error::clipboard(format!("failed to open system clipboard: {e}")))?;
        clipboard
            .set_text(text.to_string())
            .map_err(|e| Error::clipboard(format!("failed to write to clipboard: {e}")))
    }
}
