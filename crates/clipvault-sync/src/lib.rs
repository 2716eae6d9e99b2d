//! # ClipVault Sync
//!
//! Remote persistence for sealed clipboard items and audit events. Nothing
//! in this crate ever sees plaintext clipboard content.

pub mod client;
pub mod error;
pub mod sink;

pub use client::RemoteClient;
pub use error::{SyncError, SyncResult};
pub use sink::{NullSink, RemoteSink};
