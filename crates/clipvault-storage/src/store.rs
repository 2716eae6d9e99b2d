//! Store trait and typed accessors

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::StorageResult;

/// Durable key-value store with JSON values.
///
/// Implementations must treat a missing key as `Ok(None)` and report
/// malformed stored JSON as `Ok(None)` as well, so callers can bootstrap
/// defaults instead of failing.
pub trait LocalStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> StorageResult<Option<Value>>;

    /// Write `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &Value) -> StorageResult<()>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> StorageResult<()>;
}

/// Typed convenience layer over [`LocalStore`].
pub trait LocalStoreExt: LocalStore {
    /// Deserialize the value under `key`. A missing key or a value that no
    /// longer matches `T` yields `None`; the latter is logged.
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> StorageResult<Option<T>> {
        match self.get(key)? {
            Some(value) => match serde_json::from_value(value) {
                Ok(typed) => Ok(Some(typed)),
                Err(err) => {
                    warn!(key, %err, "stored value is malformed, falling back to defaults");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    /// Serialize `value` and write it under `key`.
    fn set_json<T: Serialize>(&self, key: &str, value: &T) -> StorageResult<()> {
        self.set(key, &serde_json::to_value(value)?)
    }

    /// Deserialize the value under `key`, or produce a default when the key
    /// is missing or the stored JSON is unusable.
    fn get_json_or_else<T: DeserializeOwned>(
        &self,
        key: &str,
        default: impl FnOnce() -> T,
    ) -> T {
        match self.get_json(key) {
            Ok(Some(value)) => value,
            Ok(None) => default(),
            Err(err) => {
                warn!(key, %err, "store read failed, falling back to defaults");
                default()
            }
        }
    }
}

impl<S: LocalStore + ?Sized> LocalStoreExt for S {}
