//! In-memory store for tests and ephemeral sessions

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;

use crate::{LocalStore, StorageResult};

/// Process-local store backed by a `HashMap`. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<Value>> {
        let entries = self.entries.lock().unwrap();
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &Value) -> StorageResult<()> {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(key.to_string(), value.clone());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut entries = self.entries.lock().unwrap();
        entries.remove(key);
        Ok(())
    }
}
