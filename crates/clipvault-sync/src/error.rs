//! Error types for remote persistence

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("session is missing or no longer valid")]
    SessionInvalid,

    #[error("server returned {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid server URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error(transparent)]
    Storage(#[from] clipvault_storage::StorageError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type SyncResult<T> = std::result::Result<T, SyncError>;
