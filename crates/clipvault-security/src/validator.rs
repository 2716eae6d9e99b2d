//! Access validation pipeline
//!
//! Ordered checks over each clipboard request; the first failing check
//! short-circuits with its reason. Every denial records exactly one audit
//! event before returning.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Timelike, Utc};
use clipvault_domain::{EventCategory, Origin, Severity};
use serde_json::json;

use crate::{BlockList, EventDraft, EventLog, PolicyStore};
use crate::ratelimit::RateLimiter;

/// A clipboard operation asking for permission.
#[derive(Debug, Clone, Default)]
pub struct AccessRequest {
    /// Captured content, when available at validation time.
    pub content: Option<String>,
    /// Origin the operation is requested from.
    pub domain: String,
    pub origin_addr: Option<String>,
    pub user_agent: Option<String>,
}

impl AccessRequest {
    pub fn for_domain(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            ..Default::default()
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }
}

/// Structured allow/deny outcome. Denials are normal control flow, never
/// errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessDecision {
    pub allowed: bool,
    pub reason: Option<String>,
}

impl AccessDecision {
    fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    fn deny(reason: &str) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.to_string()),
        }
    }
}

/// Evaluates requests against the current policy and ephemeral counters.
pub struct AccessValidator {
    policy: Arc<PolicyStore>,
    events: Arc<EventLog>,
    blocks: Arc<BlockList>,
    limiter: RateLimiter,
}

impl AccessValidator {
    pub fn new(policy: Arc<PolicyStore>, events: Arc<EventLog>, blocks: Arc<BlockList>) -> Self {
        Self {
            policy,
            events,
            blocks,
            limiter: RateLimiter::new(),
        }
    }

    /// Run the pipeline for `request` at the current time.
    pub fn validate(&self, request: &AccessRequest) -> AccessDecision {
        self.validate_at(request, Utc::now())
    }

    /// Pipeline order: block check, rate limit, domain whitelist, time
    /// restriction, content scan.
    pub fn validate_at(&self, request: &AccessRequest, now: DateTime<Utc>) -> AccessDecision {
        let policy = self.policy.policy();
        let origin = Origin::new(request.domain.as_str());
        let user_agent = request.user_agent.clone().unwrap_or_default();

        if self.blocks.is_blocked_at(
            origin.as_str(),
            policy.threat_detection.block_duration_ms,
            now,
        ) {
            self.events.append(
                EventDraft::new(
                    EventCategory::AccessControl,
                    Severity::Medium,
                    "Request from temporarily blocked origin denied",
                )
                .source("access_validator")
                .origin(origin.as_str())
                .user_agent(&user_agent)
                .blocked(true),
            );
            return AccessDecision::deny("origin is temporarily blocked");
        }

        let count = self.limiter.register_at(origin.as_str(), now);
        if count > policy.threat_detection.max_requests_per_minute {
            self.events.append(
                EventDraft::new(
                    EventCategory::AccessControl,
                    Severity::Medium,
                    "Rate limit exceeded",
                )
                .source("access_validator")
                .origin(origin.as_str())
                .user_agent(&user_agent)
                .blocked(true)
                .details(json!({ "requests_this_minute": count })),
            );
            return AccessDecision::deny("rate limit exceeded");
        }

        if !domain_allowed(&origin, &policy.access_control.domain_whitelist) {
            self.events.append(
                EventDraft::new(
                    EventCategory::AccessControl,
                    Severity::Medium,
                    "Domain not whitelisted",
                )
                .source("access_validator")
                .origin(origin.as_str())
                .user_agent(&user_agent)
                .blocked(true)
                .details(json!({ "domain": origin.as_str() })),
            );
            return AccessDecision::deny("domain not authorized");
        }

        if !time_allowed(&policy.access_control.time_restrictions, now) {
            self.events.append(
                EventDraft::new(
                    EventCategory::PolicyViolation,
                    Severity::Medium,
                    "Request outside allowed access window",
                )
                .source("access_validator")
                .origin(origin.as_str())
                .user_agent(&user_agent)
                .blocked(true),
            );
            return AccessDecision::deny("access not allowed at this time");
        }

        if let Some(content) = &request.content {
            if let Some(pattern) =
                matching_pattern(content, &policy.threat_detection.suspicious_patterns)
            {
                self.events.append(
                    EventDraft::new(
                        EventCategory::ThreatDetection,
                        Severity::High,
                        "Suspicious content detected",
                    )
                    .source("access_validator")
                    .origin(origin.as_str())
                    .user_agent(&user_agent)
                    .blocked(true)
                    .details(json!({
                        "pattern": pattern,
                        "preview": content.chars().take(100).collect::<String>(),
                    })),
                );
                return AccessDecision::deny("content contains suspicious patterns");
            }
        }

        AccessDecision::allow()
    }
}

/// Exact entry, wildcard, or the loopback equivalence class.
fn domain_allowed(origin: &Origin, whitelist: &[String]) -> bool {
    if whitelist.iter().any(|entry| entry == "*") {
        return true;
    }
    if whitelist
        .iter()
        .any(|entry| Origin::new(entry.as_str()) == *origin)
    {
        return true;
    }
    if origin.is_loopback() {
        return whitelist
            .iter()
            .any(|entry| Origin::new(entry.as_str()).is_loopback());
    }
    false
}

fn time_allowed(
    restrictions: &clipvault_domain::TimeRestrictions,
    now: DateTime<Utc>,
) -> bool {
    if !restrictions.enabled {
        return true;
    }
    let hour = now.hour();
    let day = now.weekday().num_days_from_sunday();
    restrictions.allowed_days.contains(&day)
        && hour >= restrictions.start_hour
        && hour <= restrictions.end_hour
}

/// First configured pattern appearing in `content`, case-insensitively.
fn matching_pattern(content: &str, patterns: &[String]) -> Option<String> {
    let lowered = content.to_lowercase();
    patterns
        .iter()
        .find(|pattern| lowered.contains(&pattern.to_lowercase()))
        .cloned()
}
