//! System clipboard seam
//!
//! The orchestrator writes retrieved plaintext to whatever implements
//! [`SystemClipboard`]. Production uses arboard; tests use the in-memory
//! variant.

use std::sync::Mutex;

use crate::error::{ClipboardError, ClipboardResult};

/// Minimal text clipboard interface.
pub trait SystemClipboard: Send + Sync {
    fn get_text(&self) -> ClipboardResult<String>;
    fn set_text(&self, text: &str) -> ClipboardResult<()>;
}

/// OS clipboard backed by arboard.
pub struct ArboardClipboard {
    inner: Mutex<arboard::Clipboard>,
}

impl ArboardClipboard {
    pub fn new() -> ClipboardResult<Self> {
        let clipboard =
            arboard::Clipboard::new().map_err(|e| ClipboardError::System(e.to_string()))?;
        Ok(Self {
            inner: Mutex::new(clipboard),
        })
    }
}

impl SystemClipboard for ArboardClipboard {
    fn get_text(&self) -> ClipboardResult<String> {
        self.inner
            .lock()
            .unwrap()
            .get_text()
            .map_err(|e| ClipboardError::System(e.to_string()))
    }

    fn set_text(&self, text: &str) -> ClipboardResult<()> {
        self.inner
            .lock()
            .unwrap()
            .set_text(text)
            .map_err(|e| ClipboardError::System(e.to_string()))
    }
}

/// In-memory clipboard for tests and headless sessions.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    content: Mutex<Option<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SystemClipboard for MemoryClipboard {
    fn get_text(&self) -> ClipboardResult<String> {
        self.content
            .lock()
            .unwrap()
            .clone()
            .ok_or(ClipboardError::ContentUnavailable)
    }

    fn set_text(&self, text: &str) -> ClipboardResult<()> {
        *self.content.lock().unwrap() = Some(text.to_string());
        Ok(())
    }
}
