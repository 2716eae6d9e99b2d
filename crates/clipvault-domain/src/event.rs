//! Audit event records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Audit trail categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Authentication,
    Encryption,
    AccessControl,
    ThreatDetection,
    PolicyViolation,
}

/// Event severity, ordered from Low to Critical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// Immutable audit record. Created only through the event log; never
/// mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityEvent {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub category: EventCategory,
    pub severity: Severity,
    pub description: String,
    /// Component or origin that produced the event.
    pub source: String,
    /// Origin the triggering request was keyed on.
    pub origin: String,
    pub user_agent: String,
    pub blocked: bool,
    pub details: serde_json::Value,
}

impl SecurityEvent {
    /// Allocate a fresh event id.
    pub fn new_id() -> String {
        Uuid::new_v4().to_string()
    }
}
