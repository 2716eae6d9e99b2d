//! # ClipVault Clipboard
//!
//! Capture and retrieval of clipboard content behind the security core.
//! Content is classified, sealed, and stored locally; remote sync is
//! best-effort.

pub mod classify;
pub mod error;
pub mod items;
pub mod orchestrator;
pub mod system;

pub use classify::classify;
pub use error::{ClipboardError, ClipboardResult};
pub use items::{ItemStore, MAX_ITEMS};
pub use orchestrator::{ClipboardObserver, ClipboardOrchestrator};
pub use system::{ArboardClipboard, MemoryClipboard, SystemClipboard};
