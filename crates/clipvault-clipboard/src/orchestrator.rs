//! Clipboard capture and retrieval orchestration
//!
//! Every operation runs the access pipeline first, stores only sealed
//! payloads, and leaves an audit trail. Remote persistence is best-effort:
//! a failed upload is logged and never rolls back the local write.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use clipvault_domain::{
    ClipboardItem, EventCategory, Origin, SecurityPolicy, Severity,
};
use clipvault_security::{
    AccessRequest, ClipboardEventKind, EventDraft, SecurityCore,
};
use clipvault_storage::{keys, LocalStore, LocalStoreExt};
use clipvault_sync::RemoteSink;
use serde_json::json;
use tracing::{debug, warn};

use crate::classify::classify;
use crate::error::{ClipboardError, ClipboardResult};
use crate::items::ItemStore;
use crate::system::SystemClipboard;

/// Callback surface for UI layers. Observer failures are the observer's
/// problem; the orchestrator never lets them affect the operation.
pub trait ClipboardObserver: Send + Sync {
    fn on_capture(&self, _item: &ClipboardItem) {}
    fn on_access(&self, _item: &ClipboardItem) {}
}

/// Coordinates validation, sealing, history, the system clipboard, and
/// remote sync for clipboard operations.
pub struct ClipboardOrchestrator {
    store: Arc<dyn LocalStore>,
    security: Arc<SecurityCore>,
    items: ItemStore,
    system: Arc<dyn SystemClipboard>,
    remote: Arc<dyn RemoteSink>,
    observers: Mutex<HashMap<u64, Arc<dyn ClipboardObserver>>>,
    next_observer_id: AtomicU64,
}

impl ClipboardOrchestrator {
    pub fn new(
        store: Arc<dyn LocalStore>,
        security: Arc<SecurityCore>,
        system: Arc<dyn SystemClipboard>,
        remote: Arc<dyn RemoteSink>,
    ) -> Self {
        let items = ItemStore::new(Arc::clone(&store));
        Self {
            store,
            security,
            items,
            system,
            remote,
            observers: Mutex::new(HashMap::new()),
            next_observer_id: AtomicU64::new(1),
        }
    }

    /// Validate, classify, seal, and store `content` captured from
    /// `origin`. Returns the stored item; its plaintext is dropped here.
    pub async fn capture(&self, content: &str, origin: &str) -> ClipboardResult<ClipboardItem> {
        let request = AccessRequest::for_domain(origin).with_content(content);
        let decision = self.security.validator.validate(&request);
        if !decision.allowed {
            let reason = decision
                .reason
                .unwrap_or_else(|| "access denied".to_string());
            return Err(ClipboardError::Denied { reason });
        }

        let content_type = classify(content);
        let sealed = match self.security.crypto.encrypt(content) {
            Ok(sealed) => sealed,
            Err(err) => {
                self.log_crypto_failure(
                    "Failed to encrypt clipboard content",
                    Origin::new(origin).as_str(),
                    json!({ "error": err.to_string() }),
                );
                return Err(err.into());
            }
        };
        let item = ClipboardItem {
            id: ClipboardItem::new_id(),
            content_type,
            origin: Origin::new(origin).as_str().to_string(),
            created_at: chrono::Utc::now(),
            device: self.device_name(),
            ciphertext: sealed.ciphertext,
            nonce: sealed.nonce,
            content_hash: self.security.crypto.hash(content),
            encrypted: true,
        };
        self.items.add(item.clone())?;
        debug!(item_id = %item.id, ?content_type, "clipboard item captured");

        if let Err(err) = self.remote.persist_item(&item).await {
            warn!(%err, item_id = %item.id, "remote persistence failed, item kept locally");
        }

        let event = self.security.events.append(
            EventDraft::new(
                EventCategory::Encryption,
                Severity::Low,
                "Clipboard item encrypted and stored",
            )
            .source("clipboard")
            .origin(item.origin.clone())
            .details(json!({ "item_id": item.id })),
        );
        if let Err(err) = self.remote.persist_event(&event).await {
            warn!(%err, "remote audit persistence failed");
        }

        self.security
            .monitor
            .on_clipboard_event(ClipboardEventKind::Copy);
        self.notify(|observer| observer.on_capture(&item));

        Ok(item)
    }

    /// Unseal the item with `id` and place its plaintext on the system
    /// clipboard.
    pub async fn copy_out(&self, id: &str) -> ClipboardResult<String> {
        let item = self
            .items
            .get(id)
            .ok_or_else(|| ClipboardError::ItemNotFound(id.to_string()))?;

        let local_origin = self.security.policy.local_origin().to_string();
        let decision = self
            .security
            .validator
            .validate(&AccessRequest::for_domain(&local_origin));
        if !decision.allowed {
            let reason = decision
                .reason
                .unwrap_or_else(|| "access denied".to_string());
            return Err(ClipboardError::Denied { reason });
        }

        if !self.retrieval_allowed(&item.origin, &local_origin) {
            self.security.events.append(
                EventDraft::new(
                    EventCategory::AccessControl,
                    Severity::Medium,
                    "Item origin not authorized for retrieval",
                )
                .source("clipboard")
                .origin(item.origin.clone())
                .blocked(true),
            );
            return Err(ClipboardError::Denied {
                reason: "item origin not authorized".to_string(),
            });
        }

        let plaintext = match self.security.crypto.decrypt(&item.ciphertext, &item.nonce) {
            Ok(plaintext) => plaintext,
            Err(err) => {
                self.log_crypto_failure(
                    "Failed to decrypt clipboard item",
                    &item.origin,
                    json!({ "item_id": item.id, "error": err.to_string() }),
                );
                return Err(ClipboardError::ContentUnavailable);
            }
        };

        if self.security.crypto.hash(&plaintext) != item.content_hash {
            self.log_crypto_failure(
                "Clipboard item failed integrity check",
                &item.origin,
                json!({ "item_id": item.id }),
            );
            return Err(ClipboardError::ContentUnavailable);
        }

        self.system.set_text(&plaintext)?;

        let event = self.security.events.append(
            EventDraft::new(
                EventCategory::AccessControl,
                Severity::Low,
                "Clipboard item accessed",
            )
            .source("clipboard")
            .origin(item.origin.clone())
            .details(json!({ "item_id": item.id })),
        );
        if let Err(err) = self.remote.persist_event(&event).await {
            warn!(%err, "remote audit persistence failed");
        }

        self.security
            .monitor
            .on_clipboard_event(ClipboardEventKind::Paste);
        self.notify(|observer| observer.on_access(&item));

        Ok(plaintext)
    }

    /// Whether an item captured from `item_origin` may be retrieved in this
    /// session. The session's own origin is always allowed in addition to
    /// the whitelist.
    fn retrieval_allowed(&self, item_origin: &str, local_origin: &str) -> bool {
        let origin = Origin::new(item_origin);
        if origin == Origin::new(local_origin) {
            return true;
        }
        let whitelist = self.security.policy.domain_whitelist();
        if whitelist.iter().any(|entry| entry == "*") {
            return true;
        }
        if whitelist
            .iter()
            .any(|entry| Origin::new(entry.as_str()) == origin)
        {
            return true;
        }
        origin.is_loopback()
            && whitelist
                .iter()
                .any(|entry| Origin::new(entry.as_str()).is_loopback())
    }

    /// Apply an administrative policy change and audit it.
    pub fn update_policy(
        &self,
        patch: impl FnOnce(&mut SecurityPolicy),
    ) -> ClipboardResult<SecurityPolicy> {
        let updated = self.security.policy.update(patch)?;
        self.security.events.append(
            EventDraft::new(
                EventCategory::AccessControl,
                Severity::Medium,
                "Security policy updated",
            )
            .source("admin"),
        );
        Ok(updated)
    }

    /// Replace the domain whitelist and audit it.
    pub fn update_domain_whitelist(&self, domains: Vec<String>) -> ClipboardResult<()> {
        self.security.policy.set_domain_whitelist(domains.clone())?;
        self.security.events.append(
            EventDraft::new(
                EventCategory::AccessControl,
                Severity::Medium,
                "Domain whitelist updated",
            )
            .source("admin")
            .details(json!({ "domains": domains })),
        );
        Ok(())
    }

    /// Delete one item from history.
    pub fn delete_item(&self, id: &str) -> ClipboardResult<bool> {
        let removed = self.items.remove(id)?;
        if removed {
            self.security.events.append(
                EventDraft::new(
                    EventCategory::AccessControl,
                    Severity::Low,
                    "Clipboard item deleted",
                )
                .source("clipboard")
                .details(json!({ "item_id": id })),
            );
        }
        Ok(removed)
    }

    /// Wipe the clipboard history.
    pub fn clear_items(&self) -> ClipboardResult<()> {
        self.items.clear()?;
        self.security.events.append(
            EventDraft::new(
                EventCategory::AccessControl,
                Severity::Low,
                "Clipboard history cleared",
            )
            .source("clipboard"),
        );
        Ok(())
    }

    /// Snapshot of the sealed history, most recent first.
    pub fn items(&self) -> Vec<ClipboardItem> {
        self.items.all()
    }

    /// Register an observer, returning a handle for removal.
    pub fn add_observer(&self, observer: Arc<dyn ClipboardObserver>) -> u64 {
        let id = self.next_observer_id.fetch_add(1, Ordering::Relaxed);
        self.observers.lock().unwrap().insert(id, observer);
        id
    }

    /// Remove a previously registered observer.
    pub fn remove_observer(&self, id: u64) -> bool {
        self.observers.lock().unwrap().remove(&id).is_some()
    }

    /// Record a sealing or unsealing failure as a high-severity encryption
    /// event. Both directions of a crypto failure leave the same trail.
    fn log_crypto_failure(&self, description: &str, origin: &str, details: serde_json::Value) {
        self.security.events.append(
            EventDraft::new(EventCategory::Encryption, Severity::High, description)
                .source("clipboard")
                .origin(origin.to_string())
                .details(details),
        );
    }

    /// Deliver to every registered observer; a panicking observer is
    /// logged and skipped, the rest still get the notification.
    fn notify(&self, f: impl Fn(&dyn ClipboardObserver)) {
        let observers: Vec<Arc<dyn ClipboardObserver>> =
            self.observers.lock().unwrap().values().cloned().collect();
        for observer in observers {
            let delivery = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                f(observer.as_ref())
            }));
            if delivery.is_err() {
                warn!("clipboard observer panicked during notification");
            }
        }
    }

    fn device_name(&self) -> String {
        self.store.get_json_or_else(keys::DEVICE_NAME, || {
            format!("clipvault-{}", std::env::consts::OS)
        })
    }
}
