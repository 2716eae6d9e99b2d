//! Clipboard item metadata

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Advisory classification of captured content. Metadata only, not a
/// security boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Text,
    Password,
    Code,
}

/// A captured clipboard entry. Only the sealed payload is stored; plaintext
/// lives transiently in memory during capture and retrieval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipboardItem {
    pub id: String,
    pub content_type: ContentType,
    /// Origin the content was captured from.
    pub origin: String,
    pub created_at: DateTime<Utc>,
    /// Human-readable label of the capturing device.
    pub device: String,
    /// Base64-encoded AES-GCM ciphertext.
    pub ciphertext: String,
    /// Hex-encoded nonce used to seal this item.
    pub nonce: String,
    /// Hex-encoded SHA-256 digest of the plaintext.
    pub content_hash: String,
    pub encrypted: bool,
}

impl ClipboardItem {
    /// Allocate a fresh item id.
    pub fn new_id() -> String {
        Uuid::new_v4().to_string()
    }
}
