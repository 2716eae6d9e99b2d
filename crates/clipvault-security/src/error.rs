//! Security-related error types

use thiserror::Error;

/// Security operation errors
#[derive(Error, Debug)]
pub enum SecurityError {
    #[error("Encryption error: {message}")]
    Encryption { message: String },

    #[error("Decryption error: {message}")]
    Decryption { message: String },

    #[error("Key material error: {message}")]
    KeyMaterial { message: String },

    #[error("Domain whitelist must not be empty")]
    EmptyWhitelist,

    #[error("Storage error: {0}")]
    Storage(#[from] clipvault_storage::StorageError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Hex decode error: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
