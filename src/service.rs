//! Namespace service: mutation orchestration over the snapshot repository.
//!
//! Control flow for every mutation: validate against the current store,
//! produce a new snapshot value, persist it, and only then adopt it. When a
//! save fails the prior snapshot stays authoritative and the error is
//! surfaced as recoverable; the caller may retry the same operation. The
//! service is strictly sequential; it never overlaps an outstanding save.

use crate::document::NamespaceDocument;
use crate::error::DriveError;
use crate::node::{FileData, NodeSummary};
use crate::persistence::SnapshotRepository;
use crate::store::NamespaceStore;
use std::sync::Arc;
use tracing::{debug, warn};

/// Owns the current in-memory snapshot and the persistence port.
pub struct NamespaceService {
    store: NamespaceStore,
    repository: Arc<dyn SnapshotRepository>,
}

impl NamespaceService {
    pub fn new(repository: Arc<dyn SnapshotRepository>) -> Self {
        NamespaceService {
            store: NamespaceStore::new(),
            repository,
        }
    }

    /// Current authoritative snapshot.
    pub fn store(&self) -> &NamespaceStore {
        &self.store
    }

    /// Load the namespace from the backing document, failing on transport or
    /// validation errors.
    pub async fn load(&mut self) -> Result<(), DriveError> {
        let doc = self.repository.load().await?;
        self.store = NamespaceStore::from_document(&doc)?;
        debug!(owners = self.store.owners().count(), "namespace loaded");
        Ok(())
    }

    /// Load the namespace, falling back to an empty one when the backing
    /// store is unreachable or empty (startup behavior).
    pub async fn load_or_default(&mut self) {
        match self.repository.load().await {
            Ok(doc) => match NamespaceStore::from_document(&doc) {
                Ok(store) => {
                    debug!(owners = store.owners().count(), "namespace loaded");
                    self.store = store;
                }
                Err(e) => {
                    warn!(error = %e, "backing document rejected; starting empty");
                    self.store = NamespaceStore::new();
                }
            },
            Err(e) => {
                warn!(error = %e, "namespace load failed; starting empty");
                self.store = NamespaceStore::new();
            }
        }
    }

    pub async fn create_drive(&mut self, owner: &str, max_size: u64) -> Result<(), DriveError> {
        debug!(owner, max_size, "create drive");
        let next = self.store.create_drive(owner, max_size)?;
        self.commit(next).await
    }

    pub async fn create_file(
        &mut self,
        owner: &str,
        dir: &str,
        name: &str,
        extension: &str,
        content: &str,
        overwrite: bool,
    ) -> Result<(), DriveError> {
        debug!(owner, dir, name, extension, overwrite, "create file");
        let next = self
            .store
            .create_file(owner, dir, name, extension, content, overwrite)?;
        self.commit(next).await
    }

    pub async fn write_file(
        &mut self,
        owner: &str,
        dir: &str,
        name: &str,
        content: &str,
    ) -> Result<(), DriveError> {
        debug!(owner, dir, name, "write file");
        let next = self.store.write_file(owner, dir, name, content)?;
        self.commit(next).await
    }

    pub async fn create_folder(
        &mut self,
        owner: &str,
        dir: &str,
        name: &str,
        overwrite: bool,
    ) -> Result<(), DriveError> {
        debug!(owner, dir, name, overwrite, "create folder");
        let next = self.store.create_folder(owner, dir, name, overwrite)?;
        self.commit(next).await
    }

    pub async fn delete_file(&mut self, owner: &str, dir: &str, name: &str) -> Result<(), DriveError> {
        debug!(owner, dir, name, "delete file");
        let next = self.store.delete_file(owner, dir, name)?;
        self.commit(next).await
    }

    pub async fn delete_folder(
        &mut self,
        owner: &str,
        dir: &str,
        name: &str,
    ) -> Result<(), DriveError> {
        debug!(owner, dir, name, "delete folder");
        let next = self.store.delete_folder(owner, dir, name)?;
        self.commit(next).await
    }

    pub async fn copy_file(
        &mut self,
        owner: &str,
        source: &str,
        target: &str,
        name: &str,
        overwrite: bool,
    ) -> Result<(), DriveError> {
        debug!(owner, source, target, name, overwrite, "copy file");
        let next = self.store.copy_file(owner, source, target, name, overwrite)?;
        self.commit(next).await
    }

    pub async fn move_item(
        &mut self,
        owner: &str,
        source: &str,
        target: &str,
        name: &str,
        overwrite: bool,
    ) -> Result<(), DriveError> {
        debug!(owner, source, target, name, overwrite, "move item");
        let next = self.store.move_item(owner, source, target, name, overwrite)?;
        self.commit(next).await
    }

    pub async fn share_item(
        &mut self,
        source_owner: &str,
        source_dir: &str,
        name: &str,
        target_owner: &str,
    ) -> Result<(), DriveError> {
        debug!(source_owner, source_dir, name, target_owner, "share item");
        let next = self
            .store
            .share_item(source_owner, source_dir, name, target_owner)?;
        self.commit(next).await
    }

    pub fn list_children(
        &self,
        owner: &str,
        dir: &str,
    ) -> Result<Vec<(String, NodeSummary)>, DriveError> {
        self.store.list_children(owner, dir)
    }

    pub fn read_file(&self, owner: &str, dir: &str, name: &str) -> Result<FileData, DriveError> {
        self.store.read_file(owner, dir, name).map(FileData::clone)
    }

    pub fn folder_paths(&self, owner: &str) -> Result<Vec<String>, DriveError> {
        self.store.folder_paths(owner)
    }

    /// Persist `next` and adopt it only on success.
    async fn commit(&mut self, next: NamespaceStore) -> Result<(), DriveError> {
        let doc: NamespaceDocument = next.to_document();
        if let Err(e) = self.repository.save(&doc).await {
            warn!(error = %e, "snapshot save failed; prior state retained");
            return Err(e.into());
        }
        self.store = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemorySnapshotRepository;

    fn service() -> (NamespaceService, Arc<MemorySnapshotRepository>) {
        let repo = Arc::new(MemorySnapshotRepository::new());
        (NamespaceService::new(repo.clone()), repo)
    }

    #[tokio::test]
    async fn test_mutation_persists_snapshot() {
        let (mut service, repo) = service();
        service.create_drive("alice", 100).await.unwrap();
        service
            .create_file("alice", "/", "a", "txt", "hello", false)
            .await
            .unwrap();
        let stored = repo.document();
        assert!(stored.contains_key("alice"));
        assert_eq!(stored["alice"].current_size, 5);
    }

    #[tokio::test]
    async fn test_failed_save_rolls_back() {
        let (mut service, repo) = service();
        service.create_drive("alice", 100).await.unwrap();
        repo.set_fail_saves(true);
        let err = service
            .create_file("alice", "/", "a", "txt", "hello", false)
            .await
            .unwrap_err();
        assert!(matches!(err, DriveError::Persistence(_)));
        // Prior snapshot stays authoritative in memory and in the store.
        assert!(!service.store().drive("alice").unwrap().has_path("/a.txt"));
        assert_eq!(repo.document()["alice"].current_size, 0);

        // The same operation succeeds once the fault clears.
        repo.set_fail_saves(false);
        service
            .create_file("alice", "/", "a", "txt", "hello", false)
            .await
            .unwrap();
        assert!(service.store().drive("alice").unwrap().has_path("/a.txt"));
    }

    #[tokio::test]
    async fn test_load_round_trips_saved_state() {
        let (mut service, repo) = service();
        service.create_drive("alice", 100).await.unwrap();
        service
            .create_file("alice", "/", "a", "txt", "hello", false)
            .await
            .unwrap();

        let mut reloaded = NamespaceService::new(repo.clone());
        reloaded.load().await.unwrap();
        assert_eq!(reloaded.store().to_document(), repo.document());
        assert_eq!(reloaded.read_file("alice", "/", "a.txt").unwrap().content, "hello");
    }

    #[tokio::test]
    async fn test_load_or_default_survives_transport_failure() {
        let repo = Arc::new(MemorySnapshotRepository::new());
        repo.set_fail_loads(true);
        let mut service = NamespaceService::new(repo.clone());
        service.load_or_default().await;
        assert_eq!(service.store().owners().count(), 0);
        assert!(matches!(
            NamespaceService::new(repo).load().await,
            Err(DriveError::Persistence(_))
        ));
    }

    #[tokio::test]
    async fn test_validation_failure_saves_nothing() {
        let (mut service, repo) = service();
        service.create_drive("alice", 4).await.unwrap();
        let before = repo.document();
        let err = service
            .create_file("alice", "/", "a", "txt", "hello", false)
            .await
            .unwrap_err();
        assert!(matches!(err, DriveError::QuotaExceeded { .. }));
        assert_eq!(repo.document(), before);
    }
}
