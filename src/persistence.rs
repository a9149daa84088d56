//! Snapshot repository port.
//!
//! The namespace is persisted wholesale: one GET fetches the entire document,
//! one PUT replaces it. There is no partial update; the last writer fully
//! overwrites. Implementations fail opaquely with `PersistenceError` and the
//! caller keeps its prior snapshot authoritative.

use crate::document::NamespaceDocument;
use crate::error::PersistenceError;
use async_trait::async_trait;
use parking_lot::Mutex;

/// Port for loading and replacing the whole namespace snapshot.
#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// Fetch the entire namespace document.
    async fn load(&self) -> Result<NamespaceDocument, PersistenceError>;

    /// Replace the entire namespace document.
    async fn save(&self, doc: &NamespaceDocument) -> Result<(), PersistenceError>;
}

/// HTTP-backed snapshot repository: GET/PUT one JSON document at a fixed
/// endpoint.
pub struct HttpSnapshotRepository {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSnapshotRepository {
    pub fn new(endpoint: impl Into<String>) -> Self {
        HttpSnapshotRepository {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl SnapshotRepository for HttpSnapshotRepository {
    async fn load(&self) -> Result<NamespaceDocument, PersistenceError> {
        let response = self.client.get(&self.endpoint).send().await?;
        if !response.status().is_success() {
            return Err(PersistenceError::Status(response.status().as_u16()));
        }
        Ok(response.json().await?)
    }

    async fn save(&self, doc: &NamespaceDocument) -> Result<(), PersistenceError> {
        let response = self.client.put(&self.endpoint).json(doc).send().await?;
        if !response.status().is_success() {
            return Err(PersistenceError::Status(response.status().as_u16()));
        }
        Ok(())
    }
}

/// In-memory snapshot repository for tests, with a failure toggle to drive
/// rollback scenarios.
#[derive(Default)]
pub struct MemorySnapshotRepository {
    document: Mutex<NamespaceDocument>,
    fail_saves: Mutex<bool>,
    fail_loads: Mutex<bool>,
}

impl MemorySnapshotRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(doc: NamespaceDocument) -> Self {
        MemorySnapshotRepository {
            document: Mutex::new(doc),
            ..Self::default()
        }
    }

    /// Make subsequent saves fail until cleared.
    pub fn set_fail_saves(&self, fail: bool) {
        *self.fail_saves.lock() = fail;
    }

    /// Make subsequent loads fail until cleared.
    pub fn set_fail_loads(&self, fail: bool) {
        *self.fail_loads.lock() = fail;
    }

    /// Current stored document, for assertions.
    pub fn document(&self) -> NamespaceDocument {
        self.document.lock().clone()
    }
}

#[async_trait]
impl SnapshotRepository for MemorySnapshotRepository {
    async fn load(&self) -> Result<NamespaceDocument, PersistenceError> {
        if *self.fail_loads.lock() {
            return Err(PersistenceError::Status(500));
        }
        Ok(self.document.lock().clone())
    }

    async fn save(&self, doc: &NamespaceDocument) -> Result<(), PersistenceError> {
        if *self.fail_saves.lock() {
            return Err(PersistenceError::Status(500));
        }
        *self.document.lock() = doc.clone();
        Ok(())
    }
}
