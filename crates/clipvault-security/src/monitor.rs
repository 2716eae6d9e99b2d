//! Passive threat monitoring
//!
//! Periodic sweeps over the audit log plus lightweight hooks the clipboard
//! layer calls on every copy and paste. The monitor never denies requests
//! itself; it raises events, and critical ones trigger the auto-block
//! machinery in the event log.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use clipvault_domain::{EventCategory, Severity};
use serde_json::json;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::{BlockList, CryptoEngine, EventDraft, EventLog, PolicyStore, Result};

/// Failed authentication attempts per origin over the trailing hour before
/// the origin is flagged.
const FAILED_AUTH_THRESHOLD: usize = 10;

/// Clipboard events inside [`RAPID_ACCESS_WINDOW_SECS`] before rapid access
/// is flagged.
const RAPID_ACCESS_THRESHOLD: usize = 10;
const RAPID_ACCESS_WINDOW_SECS: i64 = 10;

/// Clipboard operation observed by the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardEventKind {
    Copy,
    Paste,
}

impl ClipboardEventKind {
    fn description(self) -> &'static str {
        match self {
            ClipboardEventKind::Copy => "Clipboard copy",
            ClipboardEventKind::Paste => "Clipboard paste",
        }
    }
}

/// Watches the event stream for attack patterns and drives key rotation
/// and block expiry from its sweep.
pub struct ThreatMonitor {
    policy: Arc<PolicyStore>,
    events: Arc<EventLog>,
    blocks: Arc<BlockList>,
    crypto: Arc<CryptoEngine>,
    clipboard_times: Mutex<Vec<DateTime<Utc>>>,
}

impl ThreatMonitor {
    pub fn new(
        policy: Arc<PolicyStore>,
        events: Arc<EventLog>,
        blocks: Arc<BlockList>,
        crypto: Arc<CryptoEngine>,
    ) -> Self {
        Self {
            policy,
            events,
            blocks,
            crypto,
            clipboard_times: Mutex::new(Vec::new()),
        }
    }

    /// One monitoring pass: lift expired blocks, scan for authentication
    /// floods, rotate the master key when due.
    pub fn sweep(&self) -> Result<()> {
        self.sweep_at(Utc::now())
    }

    pub fn sweep_at(&self, now: DateTime<Utc>) -> Result<()> {
        let policy = self.policy.policy();

        for origin in self
            .blocks
            .expire_stale(policy.threat_detection.block_duration_ms, now)
        {
            self.events.append(
                EventDraft::new(
                    EventCategory::AccessControl,
                    Severity::Low,
                    "Temporary block expired",
                )
                .source("threat_monitor")
                .origin(origin),
            );
        }

        if policy.threat_detection.enabled {
            self.detect_failed_auth(now, policy.threat_detection.block_duration_ms);
        }

        if self
            .crypto
            .rotate_if_due_at(policy.key_rotation_interval, now)?
        {
            self.events.append(
                EventDraft::new(
                    EventCategory::Encryption,
                    Severity::Medium,
                    "Encryption keys rotated",
                )
                .source("key_manager"),
            );
        }

        Ok(())
    }

    /// Flag origins with more than [`FAILED_AUTH_THRESHOLD`] failed
    /// authentication events over the trailing hour. The resulting critical
    /// event auto-blocks the origin. Only failures newer than an origin's
    /// last flag are counted, so repeated sweeps over the same failures do
    /// not restart the block window.
    fn detect_failed_auth(&self, now: DateTime<Utc>, block_duration_ms: i64) {
        use std::collections::HashMap;

        let window = self.events.events_since(now - Duration::hours(1));

        let mut flagged_at: HashMap<&str, DateTime<Utc>> = HashMap::new();
        for event in &window {
            if event.category == EventCategory::ThreatDetection
                && event.severity == Severity::Critical
            {
                let entry = flagged_at.entry(&event.origin).or_insert(event.timestamp);
                if event.timestamp > *entry {
                    *entry = event.timestamp;
                }
            }
        }

        let mut per_origin: HashMap<String, usize> = HashMap::new();
        for event in &window {
            if event.category != EventCategory::Authentication
                || !event.description.to_lowercase().contains("failed")
            {
                continue;
            }
            if let Some(flag) = flagged_at.get(event.origin.as_str()) {
                if event.timestamp <= *flag {
                    continue;
                }
            }
            *per_origin.entry(event.origin.clone()).or_default() += 1;
        }

        for (origin, count) in per_origin {
            if count <= FAILED_AUTH_THRESHOLD {
                continue;
            }
            if self.blocks.is_blocked_at(&origin, block_duration_ms, now) {
                continue;
            }
            warn!(%origin, count, "authentication flood detected");
            self.events.append(
                EventDraft::new(
                    EventCategory::ThreatDetection,
                    Severity::Critical,
                    "Multiple failed authentication attempts",
                )
                .source("threat_monitor")
                .origin(origin)
                .blocked(true)
                .details(json!({ "failed_attempts": count })),
            );
        }
    }

    /// Record a clipboard operation and check for rapid access bursts.
    pub fn on_clipboard_event(&self, kind: ClipboardEventKind) {
        self.on_clipboard_event_at(kind, Utc::now());
    }

    pub fn on_clipboard_event_at(&self, kind: ClipboardEventKind, now: DateTime<Utc>) {
        self.events.append(
            EventDraft::new(EventCategory::AccessControl, Severity::Low, kind.description())
                .source("clipboard_monitor"),
        );

        let burst = {
            let mut times = self.clipboard_times.lock().unwrap();
            times.push(now);
            times.retain(|t| {
                now.signed_duration_since(*t) <= Duration::seconds(RAPID_ACCESS_WINDOW_SECS)
            });
            times.len()
        };

        if burst > RAPID_ACCESS_THRESHOLD {
            self.events.append(
                EventDraft::new(
                    EventCategory::ThreatDetection,
                    Severity::High,
                    "Rapid clipboard access detected, possible exfiltration",
                )
                .source("clipboard_monitor")
                .details(json!({ "events_in_window": burst })),
            );
        }
    }

    /// Record an externally observed anomaly. High and critical anomalies
    /// are marked as blocked.
    pub fn report_anomaly(
        &self,
        description: &str,
        severity: Severity,
        details: serde_json::Value,
    ) -> clipvault_domain::SecurityEvent {
        self.events.append(
            EventDraft::new(EventCategory::ThreatDetection, severity, description)
                .source("threat_monitor")
                .blocked(severity >= Severity::High)
                .details(details),
        )
    }

    /// Point-in-time security posture, including the aggregate score.
    pub fn metrics(&self) -> serde_json::Value {
        self.metrics_at(Utc::now())
    }

    pub fn metrics_at(&self, now: DateTime<Utc>) -> serde_json::Value {
        let policy = self.policy.policy();
        let events = self.events.recent(crate::events::MAX_EVENTS);

        let last_24h = self.events.events_since(now - Duration::hours(24)).len();
        let last_7d = self.events.events_since(now - Duration::days(7)).len();
        let critical = events
            .iter()
            .filter(|e| e.severity == Severity::Critical)
            .count();
        let threats = events
            .iter()
            .filter(|e| e.category == EventCategory::ThreatDetection)
            .count();
        let blocked = events.iter().filter(|e| e.blocked).count();

        let mut score: i64 = 100;
        score -= critical as i64 * 10;
        score -= threats as i64 * 5;
        score -= blocked as i64 * 2;
        if policy.require_two_factor {
            score += 5;
        }
        if policy.enable_biometric {
            score += 5;
        }
        if policy.threat_detection.enabled {
            score += 10;
        }
        if !policy.allow_guest_access {
            score += 5;
        }
        let score = score.clamp(0, 100);

        json!({
            "total_events": events.len(),
            "events_last_24h": last_24h,
            "events_last_7d": last_7d,
            "critical_events": critical,
            "threats_detected": threats,
            "blocked_requests": blocked,
            "active_blocks": self.blocks.len(),
            "last_key_rotation": self.crypto.last_rotation(),
            "security_score": score,
        })
    }

    /// Run [`ThreatMonitor::sweep`] every `period` on the tokio runtime.
    /// Aborting the returned handle stops the loop.
    pub fn spawn(self: &Arc<Self>, period: std::time::Duration) -> JoinHandle<()> {
        let monitor = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            info!(period_secs = period.as_secs(), "threat monitor started");
            loop {
                interval.tick().await;
                if let Err(err) = monitor.sweep() {
                    warn!(%err, "threat monitor sweep failed");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipvault_storage::{LocalStore, MemoryStore};

    struct Fixture {
        policy: Arc<PolicyStore>,
        events: Arc<EventLog>,
        blocks: Arc<BlockList>,
        crypto: Arc<CryptoEngine>,
        monitor: ThreatMonitor,
    }

    fn fixture() -> Fixture {
        let store: Arc<dyn LocalStore> = Arc::new(MemoryStore::new());
        let policy = Arc::new(PolicyStore::new(Arc::clone(&store), "localhost").unwrap());
        let blocks = Arc::new(BlockList::new());
        let events = Arc::new(EventLog::new(
            Arc::clone(&store),
            Arc::clone(&policy),
            Arc::clone(&blocks),
        ));
        let crypto = Arc::new(CryptoEngine::new(store).unwrap());
        let monitor = ThreatMonitor::new(
            Arc::clone(&policy),
            Arc::clone(&events),
            Arc::clone(&blocks),
            Arc::clone(&crypto),
        );
        Fixture {
            policy,
            events,
            blocks,
            crypto,
            monitor,
        }
    }

    fn failed_login(origin: &str) -> EventDraft {
        EventDraft::new(
            EventCategory::Authentication,
            Severity::Medium,
            "Failed login attempt",
        )
        .origin(origin)
    }

    #[test]
    fn authentication_flood_blocks_origin() {
        let f = fixture();
        for _ in 0..11 {
            f.events.append(failed_login("attacker.example"));
        }

        f.monitor.sweep().unwrap();
        assert!(f.blocks.is_blocked("attacker.example", 300_000));

        let flagged = f.events.recent(1);
        assert_eq!(flagged[0].severity, Severity::Critical);
        assert_eq!(flagged[0].category, EventCategory::ThreatDetection);
    }

    #[test]
    fn flood_threshold_is_strict() {
        let f = fixture();
        for _ in 0..10 {
            f.events.append(failed_login("borderline.example"));
        }
        f.monitor.sweep().unwrap();
        assert!(!f.blocks.is_blocked("borderline.example", 300_000));
    }

    #[test]
    fn repeated_sweeps_do_not_restart_block_window() {
        let f = fixture();
        for _ in 0..11 {
            f.events.append(failed_login("attacker.example"));
        }
        f.monitor.sweep().unwrap();
        let count_after_first = f.events.len();
        f.monitor.sweep().unwrap();
        assert_eq!(f.events.len(), count_after_first);
    }

    #[test]
    fn expired_block_is_lifted_and_logged() {
        let f = fixture();
        let now = Utc::now();
        f.blocks
            .block_at("stale.example", now - Duration::milliseconds(400_000));

        f.monitor.sweep_at(now).unwrap();
        assert!(!f.blocks.is_blocked_at("stale.example", 300_000, now));

        let recent = f.events.recent(1);
        assert_eq!(recent[0].description, "Temporary block expired");
        assert_eq!(recent[0].origin, "stale.example");
    }

    #[test]
    fn sweep_rotates_keys_when_due() {
        let f = fixture();
        let before = f.crypto.last_rotation();

        f.monitor.sweep_at(before + Duration::days(1)).unwrap();
        assert_eq!(f.crypto.last_rotation(), before);

        let later = before + Duration::days(8);
        f.monitor.sweep_at(later).unwrap();
        assert_eq!(f.crypto.last_rotation(), later);

        let recent = f.events.recent(1);
        assert_eq!(recent[0].category, EventCategory::Encryption);
        assert_eq!(recent[0].source, "key_manager");
    }

    #[test]
    fn rapid_clipboard_access_raises_threat() {
        let f = fixture();
        let now = Utc::now();
        for _ in 0..11 {
            f.monitor
                .on_clipboard_event_at(ClipboardEventKind::Copy, now);
        }

        let recent = f.events.recent(1);
        assert_eq!(recent[0].category, EventCategory::ThreatDetection);
        assert_eq!(recent[0].severity, Severity::High);
        // detection only, no block
        assert!(f.blocks.is_empty());
    }

    #[test]
    fn spaced_clipboard_events_stay_quiet() {
        let f = fixture();
        let start = Utc::now();
        for i in 0..20 {
            f.monitor.on_clipboard_event_at(
                ClipboardEventKind::Paste,
                start + Duration::seconds(i * 30),
            );
        }
        let threats = f
            .events
            .recent(100)
            .into_iter()
            .filter(|e| e.category == EventCategory::ThreatDetection)
            .count();
        assert_eq!(threats, 0);
    }

    #[test]
    fn anomaly_severity_sets_blocked_flag() {
        let f = fixture();
        let low = f
            .monitor
            .report_anomaly("odd but harmless", Severity::Low, serde_json::Value::Null);
        assert!(!low.blocked);

        let high = f.monitor.report_anomaly(
            "injection attempt",
            Severity::High,
            json!({ "vector": "dom" }),
        );
        assert!(high.blocked);
    }

    #[test]
    fn metrics_score_reflects_events() {
        let f = fixture();
        // Hardened default policy with an empty log pins the score at 100.
        assert_eq!(f.monitor.metrics()["security_score"], 100);

        // Disabling threat detection also skips auto-block on criticals.
        f.policy
            .update(|p| {
                p.require_two_factor = false;
                p.enable_biometric = false;
                p.threat_detection.enabled = false;
                p.threat_detection.auto_block = false;
                p.allow_guest_access = true;
            })
            .unwrap();
        for _ in 0..3 {
            f.monitor
                .report_anomaly("probe", Severity::Critical, serde_json::Value::Null);
        }

        let metrics = f.monitor.metrics();
        assert_eq!(metrics["critical_events"], 3);
        assert_eq!(metrics["threats_detected"], 3);
        assert_eq!(metrics["blocked_requests"], 3);
        // 100 - 3*10 - 3*5 - 3*2 with no posture bonuses
        assert_eq!(metrics["security_score"], 49);
    }

    #[tokio::test]
    async fn spawned_monitor_sweeps_periodically() {
        let store: Arc<dyn LocalStore> = Arc::new(MemoryStore::new());
        let policy = Arc::new(PolicyStore::new(Arc::clone(&store), "localhost").unwrap());
        let blocks = Arc::new(BlockList::new());
        let events = Arc::new(EventLog::new(
            Arc::clone(&store),
            Arc::clone(&policy),
            Arc::clone(&blocks),
        ));
        let crypto = Arc::new(CryptoEngine::new(store).unwrap());
        let monitor = Arc::new(ThreatMonitor::new(
            policy,
            Arc::clone(&events),
            blocks,
            crypto,
        ));
        for _ in 0..11 {
            events.append(failed_login("attacker.example"));
        }

        let handle = monitor.spawn(std::time::Duration::from_millis(10));
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        handle.abort();

        let critical = events
            .recent(100)
            .into_iter()
            .filter(|e| e.severity == Severity::Critical)
            .count();
        assert_eq!(critical, 1);
    }
}
