//! Remote persistence seam
//!
//! The clipboard layer talks to this trait rather than to the HTTP client
//! directly, so tests and offline sessions can swap in [`NullSink`].

use async_trait::async_trait;
use clipvault_domain::{ClipboardItem, SecurityEvent};

use crate::client::RemoteClient;
use crate::error::SyncResult;

/// Destination for sealed items and audit events.
#[async_trait]
pub trait RemoteSink: Send + Sync {
    async fn persist_item(&self, item: &ClipboardItem) -> SyncResult<()>;
    async fn persist_event(&self, event: &SecurityEvent) -> SyncResult<()>;
}

#[async_trait]
impl RemoteSink for RemoteClient {
    async fn persist_item(&self, item: &ClipboardItem) -> SyncResult<()> {
        RemoteClient::persist_item(self, item).await
    }

    async fn persist_event(&self, event: &SecurityEvent) -> SyncResult<()> {
        RemoteClient::persist_event(self, event).await
    }
}

/// Sink that accepts everything and stores nothing. Used when no sync
/// server is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

#[async_trait]
impl RemoteSink for NullSink {
    async fn persist_item(&self, _item: &ClipboardItem) -> SyncResult<()> {
        Ok(())
    }

    async fn persist_event(&self, _event: &SecurityEvent) -> SyncResult<()> {
        Ok(())
    }
}
