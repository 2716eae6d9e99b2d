//! Per-origin auto-block state
//!
//! Ephemeral working state. Blocks are keyed on the request origin and
//! lifted either lazily (a check outside the window) or by the threat
//! monitor's sweep, which also emits the expiry events.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

/// Blocked-until bookkeeping per origin. Not persisted; resets on restart.
#[derive(Debug, Default)]
pub struct BlockList {
    blocked: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl BlockList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `origin` as blocked starting now.
    pub fn block(&self, origin: &str) {
        self.block_at(origin, Utc::now());
    }

    pub fn block_at(&self, origin: &str, start: DateTime<Utc>) {
        let mut blocked = self.blocked.lock().unwrap();
        blocked.insert(origin.to_string(), start);
    }

    /// Whether `origin` is inside an active block window of the given
    /// duration. Expired entries are left in place for the sweep to log.
    pub fn is_blocked(&self, origin: &str, duration_ms: i64) -> bool {
        self.is_blocked_at(origin, duration_ms, Utc::now())
    }

    pub fn is_blocked_at(&self, origin: &str, duration_ms: i64, now: DateTime<Utc>) -> bool {
        let blocked = self.blocked.lock().unwrap();
        match blocked.get(origin) {
            Some(start) => now.signed_duration_since(*start) < Duration::milliseconds(duration_ms),
            None => false,
        }
    }

    /// Drop entries whose window has elapsed, returning the lifted origins.
    pub fn expire_stale(&self, duration_ms: i64, now: DateTime<Utc>) -> Vec<String> {
        let mut blocked = self.blocked.lock().unwrap();
        let expired: Vec<String> = blocked
            .iter()
            .filter(|(_, start)| {
                now.signed_duration_since(**start) >= Duration::milliseconds(duration_ms)
            })
            .map(|(origin, _)| origin.clone())
            .collect();
        for origin in &expired {
            blocked.remove(origin);
        }
        expired
    }

    /// Number of currently tracked blocks.
    pub fn len(&self) -> usize {
        self.blocked.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
