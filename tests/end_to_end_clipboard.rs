//! End-to-end clipboard workflows over the full stack

use std::sync::Arc;

use clipvault_clipboard::{
    ClipboardError, ClipboardOrchestrator, MemoryClipboard, SystemClipboard,
};
use clipvault_security::SecurityCore;
use clipvault_storage::{FileStore, LocalStore, MemoryStore};
use clipvault_sync::NullSink;

fn orchestrator_over(store: Arc<dyn LocalStore>) -> (ClipboardOrchestrator, Arc<MemoryClipboard>) {
    let security = Arc::new(SecurityCore::new(Arc::clone(&store), "localhost").unwrap());
    let system = Arc::new(MemoryClipboard::new());
    let orchestrator = ClipboardOrchestrator::new(
        store,
        security,
        Arc::clone(&system) as Arc<dyn SystemClipboard>,
        Arc::new(NullSink),
    );
    (orchestrator, system)
}

#[tokio::test]
async fn capture_and_retrieve_through_the_full_stack() {
    let (orchestrator, system) = orchestrator_over(Arc::new(MemoryStore::new()));

    let item = orchestrator.capture("hello world", "localhost").await.unwrap();
    assert!(item.encrypted);

    let plaintext = orchestrator.copy_out(&item.id).await.unwrap();
    assert_eq!(plaintext, "hello world");
    assert_eq!(system.get_text().unwrap(), "hello world");
}

#[tokio::test]
async fn unauthorized_origin_is_rejected_end_to_end() {
    let (orchestrator, _) = orchestrator_over(Arc::new(MemoryStore::new()));

    let err = orchestrator.capture("payload", "evil.example").await.unwrap_err();
    match err {
        ClipboardError::Denied { reason } => assert_eq!(reason, "domain not authorized"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(orchestrator.items().is_empty());
}

#[tokio::test]
async fn history_survives_restart_on_disk() {
    let dir = tempfile::tempdir().unwrap();

    let item_id = {
        let store: Arc<dyn LocalStore> = Arc::new(FileStore::new(dir.path()).unwrap());
        let (orchestrator, _) = orchestrator_over(store);
        orchestrator
            .capture("durable across sessions", "localhost")
            .await
            .unwrap()
            .id
    };

    // fresh process over the same directory
    let store: Arc<dyn LocalStore> = Arc::new(FileStore::new(dir.path()).unwrap());
    let (orchestrator, _) = orchestrator_over(store);
    let plaintext = orchestrator.copy_out(&item_id).await.unwrap();
    assert_eq!(plaintext, "durable across sessions");
}

#[tokio::test]
async fn key_rotation_preserves_existing_history() {
    let store: Arc<dyn LocalStore> = Arc::new(MemoryStore::new());
    let security = Arc::new(SecurityCore::new(Arc::clone(&store), "localhost").unwrap());
    let system = Arc::new(MemoryClipboard::new());
    let orchestrator = ClipboardOrchestrator::new(
        store,
        Arc::clone(&security),
        system as Arc<dyn SystemClipboard>,
        Arc::new(NullSink),
    );

    let item = orchestrator.capture("pre-rotation", "localhost").await.unwrap();
    security.crypto.rotate().unwrap();
    assert_eq!(orchestrator.copy_out(&item.id).await.unwrap(), "pre-rotation");
}

#[tokio::test]
async fn audit_trail_records_every_operation() {
    let store: Arc<dyn LocalStore> = Arc::new(MemoryStore::new());
    let security = Arc::new(SecurityCore::new(Arc::clone(&store), "localhost").unwrap());
    let system = Arc::new(MemoryClipboard::new());
    let orchestrator = ClipboardOrchestrator::new(
        store,
        Arc::clone(&security),
        system as Arc<dyn SystemClipboard>,
        Arc::new(NullSink),
    );

    let before = security.events.len();
    let item = orchestrator.capture("audited", "localhost").await.unwrap();
    orchestrator.copy_out(&item.id).await.unwrap();
    orchestrator.delete_item(&item.id).unwrap();

    assert!(security.events.len() > before);
    let descriptions: Vec<String> = security
        .events
        .recent(20)
        .into_iter()
        .map(|e| e.description)
        .collect();
    assert!(descriptions.iter().any(|d| d == "Clipboard item encrypted and stored"));
    assert!(descriptions.iter().any(|d| d == "Clipboard item accessed"));
    assert!(descriptions.iter().any(|d| d == "Clipboard item deleted"));
}
