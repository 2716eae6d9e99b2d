//! Append-only audit event log
//!
//! Every component records security events through [`EventLog::append`].
//! The log is ordered most-recent-first, capped, persisted to the local
//! store, and cleared only by an explicit administrative action.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use clipvault_domain::{EventCategory, SecurityEvent, Severity};
use clipvault_storage::{keys, LocalStore, LocalStoreExt};
use tracing::{debug, warn};

use crate::{BlockList, PolicyStore};

/// Oldest events are trimmed past this count.
pub const MAX_EVENTS: usize = 1000;

/// Input for a new audit record. Identity and timestamp are filled by the
/// log on append.
#[derive(Debug, Clone)]
pub struct EventDraft {
    pub category: EventCategory,
    pub severity: Severity,
    pub description: String,
    pub source: String,
    pub origin: String,
    pub user_agent: String,
    pub blocked: bool,
    pub details: serde_json::Value,
}

impl EventDraft {
    pub fn new(
        category: EventCategory,
        severity: Severity,
        description: impl Into<String>,
    ) -> Self {
        Self {
            category,
            severity,
            description: description.into(),
            source: "core".to_string(),
            origin: "local".to_string(),
            user_agent: "clipvault-core".to_string(),
            blocked: false,
            details: serde_json::Value::Null,
        }
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn blocked(mut self, blocked: bool) -> Self {
        self.blocked = blocked;
        self
    }

    pub fn details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }
}

/// The audit trail. Single entry point for event creation; records are
/// immutable once appended.
pub struct EventLog {
    store: Arc<dyn LocalStore>,
    policy: Arc<PolicyStore>,
    blocks: Arc<BlockList>,
    events: Mutex<Vec<SecurityEvent>>,
}

impl EventLog {
    /// Load the persisted log; a missing or malformed entry starts empty.
    pub fn new(
        store: Arc<dyn LocalStore>,
        policy: Arc<PolicyStore>,
        blocks: Arc<BlockList>,
    ) -> Self {
        let events: Vec<SecurityEvent> =
            store.get_json_or_else(keys::SECURITY_EVENTS, Vec::new);
        Self {
            store,
            policy,
            blocks,
            events: Mutex::new(events),
        }
    }

    /// Append a record built from `draft`. Critical events auto-block their
    /// origin when the policy asks for it. Persistence failures are logged
    /// and do not fail the append.
    pub fn append(&self, draft: EventDraft) -> SecurityEvent {
        let event = SecurityEvent {
            id: SecurityEvent::new_id(),
            timestamp: Utc::now(),
            category: draft.category,
            severity: draft.severity,
            description: draft.description,
            source: draft.source,
            origin: draft.origin,
            user_agent: draft.user_agent,
            blocked: draft.blocked,
            details: draft.details,
        };
        debug!(
            category = ?event.category,
            severity = ?event.severity,
            description = %event.description,
            "security event"
        );

        {
            let mut events = self.events.lock().unwrap();
            events.insert(0, event.clone());
            events.truncate(MAX_EVENTS);
            if let Err(err) = self.store.set_json(keys::SECURITY_EVENTS, &*events) {
                warn!(%err, "failed to persist security events");
            }
        }

        if event.severity == Severity::Critical
            && self.policy.policy().threat_detection.auto_block
        {
            self.blocks.block(&event.origin);
        }

        event
    }

    /// The `n` most recent events.
    pub fn recent(&self, n: usize) -> Vec<SecurityEvent> {
        let events = self.events.lock().unwrap();
        events.iter().take(n).cloned().collect()
    }

    /// All events newer than `since`, most recent first.
    pub fn events_since(&self, since: DateTime<Utc>) -> Vec<SecurityEvent> {
        let events = self.events.lock().unwrap();
        events
            .iter()
            .take_while(|e| e.timestamp > since)
            .cloned()
            .collect()
    }

    /// Total number of retained events.
    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Administrative wipe of the audit trail.
    pub fn clear(&self) {
        let mut events = self.events.lock().unwrap();
        events.clear();
        if let Err(err) = self.store.set_json(keys::SECURITY_EVENTS, &*events) {
            warn!(%err, "failed to persist cleared event log");
        }
    }
}
