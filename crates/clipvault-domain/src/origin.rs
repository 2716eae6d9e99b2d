//! Origin normalization
//!
//! An origin is the hostname a clipboard operation is requested from,
//! optionally with a port. Origins are the keying unit for whitelists,
//! blocks, and rate limits. Loopback spellings (`localhost`, `127.0.0.1`,
//! with or without port) form a single equivalence class.

use serde::{Deserialize, Serialize};

/// A normalized request origin.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Origin(String);

impl Origin {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into().trim().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Hostname without the port suffix.
    pub fn host(&self) -> &str {
        self.0.split(':').next().unwrap_or(&self.0)
    }

    /// True for any spelling of the local loopback.
    pub fn is_loopback(&self) -> bool {
        matches!(self.host(), "localhost" | "127.0.0.1")
    }
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Origin {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}
