//! # ClipVault Domain
//!
//! Shared entities and value objects for the ClipVault security core.
//!
//! This crate provides:
//! - Security policy configuration types
//! - Audit event records
//! - Clipboard item metadata
//! - Origin normalization and loopback handling

pub mod event;
pub mod item;
pub mod origin;
pub mod policy;

pub use event::{EventCategory, SecurityEvent, Severity};
pub use item::{ClipboardItem, ContentType};
pub use origin::Origin;
pub use policy::{
    AccessControl, PasswordPolicy, SecurityPolicy, ThreatDetection, TimeRestrictions,
};
