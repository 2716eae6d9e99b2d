//! File-backed store
//!
//! One JSON file per key under a base directory. Unreadable or malformed
//! files are treated as missing so a corrupted entry never takes the
//! process down.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::warn;

use crate::{LocalStore, StorageError, StorageResult};

/// Durable store writing each key to `<base>/<key>.json`.
pub struct FileStore {
    base_path: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `base_path`, creating the directory if needed.
    pub fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path).map_err(|e| StorageError::io(base_path.clone(), e))?;
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn entry_path(&self, key: &str) -> StorageResult<PathBuf> {
        // Keys become file names; reject anything that could escape the base
        // directory.
        if key.is_empty()
            || !key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.base_path.join(format!("{key}.json")))
    }
}

impl LocalStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<Value>> {
        let path = self.entry_path(key)?;
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::io(path, e)),
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                warn!(key, %err, "stored file is not valid JSON, treating as missing");
                Ok(None)
            }
        }
    }

    fn set(&self, key: &str, value: &Value) -> StorageResult<()> {
        let path = self.entry_path(key)?;
        let raw = serde_json::to_string_pretty(value)?;
        // Write to a sibling temp file and rename, so a crash mid-write
        // never leaves a truncated entry behind.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, raw).map_err(|e| StorageError::io(tmp.clone(), e))?;
        fs::rename(&tmp, &path).map_err(|e| StorageError::io(path, e))
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let path = self.entry_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::io(path, e)),
        }
    }
}
