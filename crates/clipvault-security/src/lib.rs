//! # ClipVault Security
//!
//! The access-control and content-protection core of ClipVault.
//!
//! This crate provides:
//! - Payload encryption under a rotating master key
//! - The ordered access-validation pipeline
//! - The append-only audit event log
//! - Passive threat monitoring and auto-blocking

pub mod blocklist;
pub mod crypto;
pub mod error;
pub mod events;
pub mod monitor;
pub mod policy;
pub mod ratelimit;
pub mod validator;

pub use blocklist::BlockList;
pub use crypto::{CryptoEngine, Sealed};
pub use error::SecurityError;
pub use events::{EventDraft, EventLog};
pub use monitor::{ClipboardEventKind, ThreatMonitor};
pub use policy::PolicyStore;
pub use validator::{AccessDecision, AccessRequest, AccessValidator};

/// Re-export commonly used result type
pub type Result<T> = std::result::Result<T, SecurityError>;

use std::sync::Arc;

use clipvault_storage::LocalStore;

/// Explicitly constructed security context wiring the core components
/// together over one shared store. Passed to consumers instead of hidden
/// process-wide singletons.
pub struct SecurityCore {
    pub policy: Arc<PolicyStore>,
    pub blocks: Arc<BlockList>,
    pub events: Arc<EventLog>,
    pub crypto: Arc<CryptoEngine>,
    pub validator: Arc<AccessValidator>,
    pub monitor: Arc<ThreatMonitor>,
}

impl SecurityCore {
    /// Build the full core over `store`, keyed to the given local origin.
    pub fn new(store: Arc<dyn LocalStore>, local_origin: &str) -> Result<Self> {
        let policy = Arc::new(PolicyStore::new(Arc::clone(&store), local_origin)?);
        let blocks = Arc::new(BlockList::new());
        let events = Arc::new(EventLog::new(
            Arc::clone(&store),
            Arc::clone(&policy),
            Arc::clone(&blocks),
        ));
        let crypto = Arc::new(CryptoEngine::new(Arc::clone(&store))?);
        let validator = Arc::new(AccessValidator::new(
            Arc::clone(&policy),
            Arc::clone(&events),
            Arc::clone(&blocks),
        ));
        let monitor = Arc::new(ThreatMonitor::new(
            Arc::clone(&policy),
            Arc::clone(&events),
            Arc::clone(&blocks),
            Arc::clone(&crypto),
        ));
        Ok(Self {
            policy,
            blocks,
            events,
            crypto,
            validator,
            monitor,
        })
    }
}
