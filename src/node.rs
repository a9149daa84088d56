//! Namespace node records.
//!
//! A drive holds a single arena of node records addressed by `NodeId`. Each
//! folder keeps an insertion-ordered list of child identifiers; the record
//! itself carries its current absolute path so listings and the path index
//! stay in one source of truth.

use crate::types::{NodeId, Timestamp};
use serde::{Deserialize, Serialize};

/// Entry kind as exposed in listings and the wire format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Folder,
    File,
}

/// File payload: content plus bookkeeping timestamps and share provenance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileData {
    pub content: String,
    /// Byte length of `content`; kept in lockstep on every write
    pub size: u64,
    pub created: Timestamp,
    pub modified: Timestamp,
    pub shared_by: Option<String>,
    pub shared_date: Option<Timestamp>,
}

impl FileData {
    /// Create a fresh file from content, stamping both timestamps to `now`.
    pub fn new(content: String, now: Timestamp) -> Self {
        let size = content.len() as u64;
        FileData {
            content,
            size,
            created: now,
            modified: now,
            shared_by: None,
            shared_date: None,
        }
    }
}

/// Node payload: folder with ordered children, or file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Folder {
        children: Vec<NodeId>,
        created: Timestamp,
    },
    File(FileData),
}

/// NodeRecord: one namespace node with its current absolute path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRecord {
    pub path: String,
    pub parent: Option<NodeId>,
    pub kind: NodeKind,
}

impl NodeRecord {
    /// New empty folder record at `path`.
    pub fn folder(path: String, parent: Option<NodeId>, created: Timestamp) -> Self {
        NodeRecord {
            path,
            parent,
            kind: NodeKind::Folder {
                children: Vec::new(),
                created,
            },
        }
    }

    /// New file record at `path`.
    pub fn file(path: String, parent: NodeId, data: FileData) -> Self {
        NodeRecord {
            path,
            parent: Some(parent),
            kind: NodeKind::File(data),
        }
    }

    pub fn entry_kind(&self) -> EntryKind {
        match self.kind {
            NodeKind::Folder { .. } => EntryKind::Folder,
            NodeKind::File(_) => EntryKind::File,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self.kind, NodeKind::Folder { .. })
    }

    pub fn as_file(&self) -> Option<&FileData> {
        match &self.kind {
            NodeKind::File(data) => Some(data),
            NodeKind::Folder { .. } => None,
        }
    }

    /// Creation timestamp regardless of kind.
    pub fn created(&self) -> Timestamp {
        match &self.kind {
            NodeKind::Folder { created, .. } => *created,
            NodeKind::File(data) => data.created,
        }
    }
}

/// Listing summary for one directory entry.
///
/// Carries what the presentation layer renders in an item row; file content
/// is fetched separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSummary {
    pub kind: EntryKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    pub created: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_by: Option<String>,
}

impl NodeSummary {
    pub fn of(record: &NodeRecord) -> Self {
        match &record.kind {
            NodeKind::Folder { created, .. } => NodeSummary {
                kind: EntryKind::Folder,
                size: None,
                created: *created,
                modified: None,
                shared_by: None,
            },
            NodeKind::File(data) => NodeSummary {
                kind: EntryKind::File,
                size: Some(data.size),
                created: data.created,
                modified: Some(data.modified),
                shared_by: data.shared_by.clone(),
            },
        }
    }
}
