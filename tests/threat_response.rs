//! Threat detection and blocking behavior over the assembled security core

use std::sync::Arc;

use chrono::{Duration, Utc};
use clipvault_domain::{EventCategory, Severity};
use clipvault_security::{AccessRequest, EventDraft, SecurityCore};
use clipvault_storage::{LocalStore, MemoryStore};
use proptest::prelude::*;

fn core() -> Arc<SecurityCore> {
    let store: Arc<dyn LocalStore> = Arc::new(MemoryStore::new());
    Arc::new(SecurityCore::new(store, "localhost").unwrap())
}

#[test]
fn authentication_flood_blocks_then_expires() {
    let core = core();
    for _ in 0..11 {
        core.events.append(
            EventDraft::new(
                EventCategory::Authentication,
                Severity::Medium,
                "Failed login attempt",
            )
            .origin("localhost"),
        );
    }

    let now = Utc::now();
    core.monitor.sweep_at(now).unwrap();

    let request = AccessRequest::for_domain("localhost");
    let denied = core.validator.validate_at(&request, now);
    assert!(!denied.allowed);
    assert_eq!(denied.reason.as_deref(), Some("origin is temporarily blocked"));

    // sweep after the block window lifts the block and logs it
    let later = now + Duration::milliseconds(300_001);
    core.monitor.sweep_at(later).unwrap();
    assert!(core.validator.validate_at(&request, later).allowed);
    assert!(core
        .events
        .recent(5)
        .iter()
        .any(|e| e.description == "Temporary block expired"));
}

#[test]
fn metrics_reflect_active_threats() {
    let core = core();
    core.monitor
        .report_anomaly("probe", Severity::Critical, serde_json::Value::Null);

    let metrics = core.monitor.metrics();
    assert_eq!(metrics["critical_events"], 1);
    assert_eq!(metrics["active_blocks"], 1);
    assert!(metrics["security_score"].as_i64().unwrap() <= 100);
}

proptest! {
    // within one minute bucket, exactly the first `limit` requests pass
    #[test]
    fn rate_limit_is_exact(limit in 1u32..30, extra in 1u32..10) {
        let core = core();
        core.policy
            .update(|p| p.threat_detection.max_requests_per_minute = limit)
            .unwrap();

        let now = Utc::now();
        let request = AccessRequest::for_domain("localhost");
        let mut allowed = 0u32;
        for _ in 0..(limit + extra) {
            if core.validator.validate_at(&request, now).allowed {
                allowed += 1;
            }
        }
        prop_assert_eq!(allowed, limit);
    }
}
