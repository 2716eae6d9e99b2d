//! Security policy configuration

use serde::{Deserialize, Serialize};

/// Session-wide security configuration.
///
/// Loaded from the local store at startup; consumers see snapshots, updates
/// go through the policy store so the whitelist invariant holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityPolicy {
    pub encryption_algorithm: String,
    pub key_exchange: String,
    /// Master key rotation interval, in days.
    pub key_rotation_interval: u32,
    /// Session timeout, in minutes.
    pub session_timeout: u32,
    pub max_failed_attempts: u32,
    pub require_two_factor: bool,
    pub enable_biometric: bool,
    pub allow_guest_access: bool,
    pub rate_limit: u32,
    pub password_policy: PasswordPolicy,
    pub access_control: AccessControl,
    pub threat_detection: ThreatDetection,
}

/// Password complexity requirements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_numbers: bool,
    pub require_symbols: bool,
    /// Maximum password age, in days.
    pub max_age: u32,
}

/// IP/domain whitelists and time-of-day restrictions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessControl {
    pub ip_whitelist: Vec<String>,
    pub domain_whitelist: Vec<String>,
    pub time_restrictions: TimeRestrictions,
}

/// Allowed access window. Hours are inclusive on both ends, days use
/// 0 = Sunday through 6 = Saturday.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeRestrictions {
    pub enabled: bool,
    pub start_hour: u32,
    pub end_hour: u32,
    pub allowed_days: Vec<u32>,
}

/// Threat detection tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreatDetection {
    pub enabled: bool,
    pub max_requests_per_minute: u32,
    /// Case-insensitive substrings that deny captured content.
    pub suspicious_patterns: Vec<String>,
    pub auto_block: bool,
    /// How long an auto-blocked origin stays blocked, in milliseconds.
    pub block_duration_ms: i64,
}

impl SecurityPolicy {
    /// Default policy seeded with the given local origin in the whitelist.
    pub fn with_origin(origin: &str) -> Self {
        let mut policy = Self::default();
        if !policy
            .access_control
            .domain_whitelist
            .iter()
            .any(|d| d == origin)
        {
            policy
                .access_control
                .domain_whitelist
                .insert(0, origin.to_string());
        }
        policy
    }
}

impl Default for SecurityPolicy {
    fn default() -> Self {
        Self {
            encryption_algorithm: "aes-256-gcm".to_string(),
            key_exchange: "rsa-2048".to_string(),
            key_rotation_interval: 7,
            session_timeout: 30,
            max_failed_attempts: 5,
            require_two_factor: true,
            enable_biometric: true,
            allow_guest_access: false,
            rate_limit: 100,
            password_policy: PasswordPolicy::default(),
            access_control: AccessControl::default(),
            threat_detection: ThreatDetection::default(),
        }
    }
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 12,
            require_uppercase: true,
            require_lowercase: true,
            require_numbers: true,
            require_symbols: true,
            max_age: 90,
        }
    }
}

impl Default for AccessControl {
    fn default() -> Self {
        Self {
            ip_whitelist: Vec::new(),
            domain_whitelist: vec![
                "localhost".to_string(),
                "127.0.0.1".to_string(),
                "localhost:5173".to_string(),
                "127.0.0.1:5173".to_string(),
            ],
            time_restrictions: TimeRestrictions::default(),
        }
    }
}

impl Default for TimeRestrictions {
    fn default() -> Self {
        Self {
            enabled: false,
            start_hour: 9,
            end_hour: 17,
            allowed_days: vec![1, 2, 3, 4, 5],
        }
    }
}

impl Default for ThreatDetection {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests_per_minute: 60,
            suspicious_patterns: vec![
                "script".to_string(),
                "eval".to_string(),
                "document.cookie".to_string(),
                "localStorage".to_string(),
                "sessionStorage".to_string(),
                "XMLHttpRequest".to_string(),
                "fetch(".to_string(),
            ],
            auto_block: true,
            block_duration_ms: 300_000,
        }
    }
}
