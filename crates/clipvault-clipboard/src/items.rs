//! Persisted clipboard history
//!
//! Most-recent-first, capped, mirrored to the local store on every change.

use std::sync::{Arc, Mutex};

use clipvault_domain::ClipboardItem;
use clipvault_storage::{keys, LocalStore, LocalStoreExt};

use crate::error::ClipboardResult;

/// Items kept in history before the oldest is dropped.
pub const MAX_ITEMS: usize = 50;

/// Durable list of sealed clipboard items.
pub struct ItemStore {
    store: Arc<dyn LocalStore>,
    items: Mutex<Vec<ClipboardItem>>,
}

impl ItemStore {
    /// Load persisted history; missing or malformed data starts empty.
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        let items: Vec<ClipboardItem> = store.get_json_or_else(keys::CLIPBOARD_ITEMS, Vec::new);
        Self {
            store,
            items: Mutex::new(items),
        }
    }

    /// Prepend `item`, dropping the oldest entry past the cap.
    pub fn add(&self, item: ClipboardItem) -> ClipboardResult<()> {
        let mut items = self.items.lock().unwrap();
        items.insert(0, item);
        items.truncate(MAX_ITEMS);
        self.store.set_json(keys::CLIPBOARD_ITEMS, &*items)?;
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<ClipboardItem> {
        self.items
            .lock()
            .unwrap()
            .iter()
            .find(|item| item.id == id)
            .cloned()
    }

    /// Remove the item with `id`, reporting whether it existed.
    pub fn remove(&self, id: &str) -> ClipboardResult<bool> {
        let mut items = self.items.lock().unwrap();
        let before = items.len();
        items.retain(|item| item.id != id);
        let removed = items.len() != before;
        if removed {
            self.store.set_json(keys::CLIPBOARD_ITEMS, &*items)?;
        }
        Ok(removed)
    }

    pub fn clear(&self) -> ClipboardResult<()> {
        let mut items = self.items.lock().unwrap();
        items.clear();
        self.store.set_json(keys::CLIPBOARD_ITEMS, &*items)?;
        Ok(())
    }

    /// Snapshot of the history, most recent first.
    pub fn all(&self) -> Vec<ClipboardItem> {
        self.items.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
