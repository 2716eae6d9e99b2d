//! Policy store
//!
//! Holds the current security policy and its persistence. Pure data and
//! accessors; escalation logic lives in the validator and monitor.

use std::sync::{Arc, Mutex};

use clipvault_domain::SecurityPolicy;
use clipvault_storage::{keys, LocalStore, LocalStoreExt};
use tracing::debug;

use crate::{Result, SecurityError};

/// Result of checking a password against the policy.
#[derive(Debug, Clone)]
pub struct PasswordCheck {
    pub valid: bool,
    pub errors: Vec<String>,
}

/// Durable holder of the session's [`SecurityPolicy`].
///
/// The domain whitelist is mirrored under its own storage key so external
/// tooling can read it without parsing the whole policy.
pub struct PolicyStore {
    store: Arc<dyn LocalStore>,
    policy: Mutex<SecurityPolicy>,
    local_origin: String,
}

impl PolicyStore {
    /// Load the persisted policy, bootstrapping defaults seeded with
    /// `local_origin` when missing or malformed.
    pub fn new(store: Arc<dyn LocalStore>, local_origin: &str) -> Result<Self> {
        let mut policy: SecurityPolicy = store
            .get_json_or_else(keys::SECURITY_POLICY, || {
                SecurityPolicy::with_origin(local_origin)
            });

        // A standalone whitelist written by an earlier session wins over
        // the copy embedded in the policy.
        if let Some(whitelist) = store.get_json::<Vec<String>>(keys::DOMAIN_WHITELIST)? {
            if !whitelist.is_empty() {
                policy.access_control.domain_whitelist = whitelist;
            }
        }

        // The whitelist must never end up empty; reseed with defaults if a
        // corrupted load produced one.
        if policy.access_control.domain_whitelist.is_empty() {
            policy.access_control.domain_whitelist =
                SecurityPolicy::with_origin(local_origin)
                    .access_control
                    .domain_whitelist;
        }

        Ok(Self {
            store,
            policy: Mutex::new(policy),
            local_origin: local_origin.to_string(),
        })
    }

    /// Snapshot of the current policy.
    pub fn policy(&self) -> SecurityPolicy {
        self.policy.lock().unwrap().clone()
    }

    /// The origin this session runs under.
    pub fn local_origin(&self) -> &str {
        &self.local_origin
    }

    /// Apply `patch` to the policy and persist the result. Rejected without
    /// effect if the patch empties the domain whitelist.
    pub fn update(&self, patch: impl FnOnce(&mut SecurityPolicy)) -> Result<SecurityPolicy> {
        let mut guard = self.policy.lock().unwrap();
        let mut updated = guard.clone();
        patch(&mut updated);

        if updated.access_control.domain_whitelist.is_empty() {
            return Err(SecurityError::EmptyWhitelist);
        }

        self.store.set_json(keys::SECURITY_POLICY, &updated)?;
        self.store.set_json(
            keys::DOMAIN_WHITELIST,
            &updated.access_control.domain_whitelist,
        )?;
        *guard = updated.clone();
        debug!("security policy updated");
        Ok(updated)
    }

    /// Current domain whitelist.
    pub fn domain_whitelist(&self) -> Vec<String> {
        self.policy
            .lock()
            .unwrap()
            .access_control
            .domain_whitelist
            .clone()
    }

    /// Replace the domain whitelist. An empty list is rejected.
    pub fn set_domain_whitelist(&self, domains: Vec<String>) -> Result<()> {
        if domains.is_empty() {
            return Err(SecurityError::EmptyWhitelist);
        }
        self.update(|policy| policy.access_control.domain_whitelist = domains)?;
        Ok(())
    }

    /// Check a password against the configured password policy, collecting
    /// every violated rule.
    pub fn validate_password(&self, password: &str) -> PasswordCheck {
        let rules = self.policy.lock().unwrap().password_policy.clone();
        let mut errors = Vec::new();

        if password.chars().count() < rules.min_length {
            errors.push(format!(
                "Password must be at least {} characters long",
                rules.min_length
            ));
        }
        if rules.require_uppercase && !password.chars().any(|c| c.is_ascii_uppercase()) {
            errors.push("Password must contain at least one uppercase letter".to_string());
        }
        if rules.require_lowercase && !password.chars().any(|c| c.is_ascii_lowercase()) {
            errors.push("Password must contain at least one lowercase letter".to_string());
        }
        if rules.require_numbers && !password.chars().any(|c| c.is_ascii_digit()) {
            errors.push("Password must contain at least one number".to_string());
        }
        if rules.require_symbols && !password.chars().any(|c| c.is_ascii_punctuation()) {
            errors.push("Password must contain at least one special character".to_string());
        }

        PasswordCheck {
            valid: errors.is_empty(),
            errors,
        }
    }
}
