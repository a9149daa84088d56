//! Persistence behavior: idempotent round-trips and rollback on failure.

use drivespace::error::DriveError;
use drivespace::persistence::{MemorySnapshotRepository, SnapshotRepository};
use drivespace::service::NamespaceService;
use drivespace::store::NamespaceStore;
use std::sync::Arc;

async fn seeded_repository() -> Arc<MemorySnapshotRepository> {
    let repo = Arc::new(MemorySnapshotRepository::new());
    let mut service = NamespaceService::new(repo.clone());
    service.create_drive("alice", 200).await.unwrap();
    service.create_drive("bob", 100).await.unwrap();
    service.create_folder("alice", "/", "docs", false).await.unwrap();
    service
        .create_file("alice", "/docs", "plan", "md", "step one", false)
        .await
        .unwrap();
    service.share_item("alice", "/docs", "plan.md", "bob").await.unwrap();
    repo
}

#[tokio::test]
async fn save_of_loaded_snapshot_is_deep_equal() {
    let repo = seeded_repository().await;
    let original = repo.load().await.unwrap();

    let store = NamespaceStore::from_document(&original).unwrap();
    repo.save(&store.to_document()).await.unwrap();
    let rewritten = repo.load().await.unwrap();

    assert_eq!(rewritten, original);
    assert_eq!(
        serde_json::to_value(&rewritten).unwrap(),
        serde_json::to_value(&original).unwrap()
    );
}

#[tokio::test]
async fn reload_preserves_listing_order_and_content() {
    let repo = seeded_repository().await;
    let mut service = NamespaceService::new(repo.clone());
    service.load().await.unwrap();

    let listing = service.list_children("alice", "/docs").unwrap();
    assert_eq!(listing[0].0, "plan.md");
    assert_eq!(service.read_file("bob", "/shared", "plan.md").unwrap().content, "step one");
}

#[tokio::test]
async fn failed_save_keeps_prior_snapshot_until_retry() {
    let repo = seeded_repository().await;
    let mut service = NamespaceService::new(repo.clone());
    service.load().await.unwrap();
    let before = repo.load().await.unwrap();

    repo.set_fail_saves(true);
    let err = service
        .delete_folder("alice", "/", "docs")
        .await
        .unwrap_err();
    assert!(matches!(err, DriveError::Persistence(_)));
    assert!(service.store().drive("alice").unwrap().has_path("/docs"));
    assert_eq!(repo.load().await.unwrap(), before);

    repo.set_fail_saves(false);
    service.delete_folder("alice", "/", "docs").await.unwrap();
    assert!(!service.store().drive("alice").unwrap().has_path("/docs"));
    assert!(!repo.load().await.unwrap()["alice"].structure.contains_key("/docs"));
}

#[tokio::test]
async fn corrupt_backing_document_is_rejected_on_load() {
    let repo = seeded_repository().await;
    let mut doc = repo.load().await.unwrap();
    doc.get_mut("alice").unwrap().structure.shift_remove("/docs");
    repo.save(&doc).await.unwrap();

    let mut service = NamespaceService::new(repo);
    let err = service.load().await.unwrap_err();
    assert!(matches!(err, DriveError::CorruptDocument(_)));
}
