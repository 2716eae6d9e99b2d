//! Well-known storage keys

pub const MASTER_KEY: &str = "clipvault_master_key";
pub const PREVIOUS_KEY: &str = "clipvault_previous_key";
pub const LAST_KEY_ROTATION: &str = "clipvault_last_key_rotation";
pub const SECURITY_POLICY: &str = "clipvault_security_policy";
pub const DOMAIN_WHITELIST: &str = "clipvault_domain_whitelist";
pub const SECURITY_EVENTS: &str = "clipvault_security_events";
pub const CLIPBOARD_ITEMS: &str = "clipvault_clipboard_items";
pub const SESSION_TOKEN: &str = "clipvault_session_token";
pub const DEVICE_NAME: &str = "clipvault_device_name";

/// Every key the store may hold, for bulk clearing.
pub const ALL: &[&str] = &[
    MASTER_KEY,
    PREVIOUS_KEY,
    LAST_KEY_ROTATION,
    SECURITY_POLICY,
    DOMAIN_WHITELIST,
    SECURITY_EVENTS,
    CLIPBOARD_ITEMS,
    SESSION_TOKEN,
    DEVICE_NAME,
];

/// Remove every well-known key from `store`. Components loaded over the
/// store keep their in-memory state; callers are expected to rebuild them
/// afterwards.
pub fn clear_all(store: &dyn crate::LocalStore) -> crate::StorageResult<()> {
    for key in ALL {
        store.remove(key)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LocalStore, MemoryStore};
    use serde_json::json;

    #[test]
    fn clear_all_removes_every_known_key() {
        let store = MemoryStore::new();
        for key in ALL {
            store.set(key, &json!("data")).unwrap();
        }
        clear_all(&store).unwrap();
        for key in ALL {
            assert!(store.get(key).unwrap().is_none());
        }
    }
}
