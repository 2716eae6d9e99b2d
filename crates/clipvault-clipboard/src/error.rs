//! Error types for clipboard orchestration

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClipboardError {
    /// The access pipeline denied the operation. Carries the denial reason
    /// for the caller; the audit event is already recorded.
    #[error("access denied: {reason}")]
    Denied { reason: String },

    #[error("clipboard content could not be recovered")]
    ContentUnavailable,

    #[error("clipboard item not found: {0}")]
    ItemNotFound(String),

    #[error("system clipboard error: {0}")]
    System(String),

    #[error(transparent)]
    Security(#[from] clipvault_security::SecurityError),

    #[error(transparent)]
    Storage(#[from] clipvault_storage::StorageError),
}

pub type ClipboardResult<T> = std::result::Result<T, ClipboardError>;
