//! Snapshot wire model.
//!
//! The persistence collaborator stores the whole namespace as one JSON
//! document: `{ [ownerName]: { maxSize, currentSize, structure } }`, where
//! `structure` maps every absolute path to a node and each folder carries a
//! `{type, created}` summary marker per child, in insertion order.
//!
//! Encoding flattens the in-memory arena into that shape; decoding rebuilds
//! the arena and validates the structural invariants (parents present,
//! summary markers matching, no orphan entries, size accounting intact),
//! rejecting corrupt documents with a typed error.

use crate::drive::Drive;
use crate::error::DriveError;
use crate::node::{EntryKind, FileData, NodeKind, NodeRecord};
use crate::path;
use crate::store::NamespaceStore;
use crate::types::{NodeId, Timestamp};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The whole namespace snapshot: owner name to drive document.
pub type NamespaceDocument = IndexMap<String, DriveDocument>;

/// One drive as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveDocument {
    pub max_size: u64,
    pub current_size: u64,
    pub structure: IndexMap<String, NodeDocument>,
}

/// One structure entry: folder with child markers, or file with content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeDocument {
    Folder {
        #[serde(default)]
        children: IndexMap<String, ChildSummary>,
        created: Timestamp,
    },
    File {
        content: String,
        size: u64,
        created: Timestamp,
        modified: Timestamp,
        #[serde(rename = "sharedBy", default, skip_serializing_if = "Option::is_none")]
        shared_by: Option<String>,
        #[serde(rename = "sharedDate", default, skip_serializing_if = "Option::is_none")]
        shared_date: Option<Timestamp>,
    },
}

/// Child marker inside a folder's `children` map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildSummary {
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub created: Timestamp,
}

impl NamespaceStore {
    /// Flatten the store into the snapshot document.
    pub fn to_document(&self) -> NamespaceDocument {
        self.drives
            .iter()
            .map(|(owner, drive)| (owner.clone(), encode_drive(drive)))
            .collect()
    }

    /// Rebuild a store from a snapshot document, validating invariants.
    pub fn from_document(doc: &NamespaceDocument) -> Result<Self, DriveError> {
        let mut drives = IndexMap::new();
        for (owner, drive_doc) in doc {
            let drive = decode_drive(drive_doc)
                .map_err(|e| match e {
                    DriveError::CorruptDocument(msg) => {
                        DriveError::CorruptDocument(format!("drive {}: {}", owner, msg))
                    }
                    other => other,
                })?;
            drives.insert(owner.clone(), drive);
        }
        Ok(NamespaceStore { drives })
    }
}

fn encode_drive(drive: &Drive) -> DriveDocument {
    let mut structure = IndexMap::new();
    emit_subtree(drive, drive.root, &mut structure);
    emit_subtree(drive, drive.shared, &mut structure);
    DriveDocument {
        max_size: drive.max_size,
        current_size: drive.current_size,
        structure,
    }
}

/// Emit `id` and its descendants in preorder, iteratively.
fn emit_subtree(drive: &Drive, id: NodeId, structure: &mut IndexMap<String, NodeDocument>) {
    let mut stack = vec![id];
    while let Some(current) = stack.pop() {
        let record = drive.record(current);
        match &record.kind {
            NodeKind::Folder { children, created } => {
                let mut markers = IndexMap::new();
                for &child in children {
                    let child_record = drive.record(child);
                    markers.insert(
                        path::leaf(&child_record.path).to_string(),
                        ChildSummary {
                            kind: child_record.entry_kind(),
                            created: child_record.created(),
                        },
                    );
                }
                structure.insert(
                    record.path.clone(),
                    NodeDocument::Folder {
                        children: markers,
                        created: *created,
                    },
                );
                stack.extend(children.iter().rev().copied());
            }
            NodeKind::File(data) => {
                structure.insert(
                    record.path.clone(),
                    NodeDocument::File {
                        content: data.content.clone(),
                        size: data.size,
                        created: data.created,
                        modified: data.modified,
                        shared_by: data.shared_by.clone(),
                        shared_date: data.shared_date,
                    },
                );
            }
        }
    }
}

fn corrupt(msg: impl Into<String>) -> DriveError {
    DriveError::CorruptDocument(msg.into())
}

fn folder_created(doc: &NodeDocument, at: &str) -> Result<Timestamp, DriveError> {
    match doc {
        NodeDocument::Folder { created, .. } => Ok(*created),
        NodeDocument::File { .. } => Err(corrupt(format!("{} must be a folder", at))),
    }
}

fn decode_drive(doc: &DriveDocument) -> Result<Drive, DriveError> {
    let root_doc = doc
        .structure
        .get(path::ROOT)
        .ok_or_else(|| corrupt("missing root folder"))?;
    let shared_doc = doc
        .structure
        .get(path::SHARED)
        .ok_or_else(|| corrupt("missing /shared folder"))?;
    let root_created = folder_created(root_doc, path::ROOT)?;
    let shared_created = folder_created(shared_doc, path::SHARED)?;

    let mut drive = Drive {
        max_size: doc.max_size,
        current_size: doc.current_size,
        nodes: HashMap::new(),
        paths: HashMap::new(),
        root: 0,
        shared: 0,
        next_id: 0,
    };
    drive.root = drive.alloc(NodeRecord::folder(path::ROOT.to_string(), None, root_created));
    drive.shared = drive.alloc(NodeRecord::folder(path::SHARED.to_string(), None, shared_created));

    let mut visited = 2usize;
    let mut pending = vec![drive.root, drive.shared];
    while let Some(folder_id) = pending.pop() {
        let folder_path = drive.record(folder_id).path.clone();
        let markers = match doc.structure.get(&folder_path) {
            Some(NodeDocument::Folder { children, .. }) => children.clone(),
            _ => return Err(corrupt(format!("{} must be a folder", folder_path))),
        };
        for (name, marker) in &markers {
            if !path::valid_name(name) {
                return Err(corrupt(format!("invalid entry name {:?} in {}", name, folder_path)));
            }
            let child_path = path::join(&folder_path, name);
            if drive.paths.contains_key(&child_path) {
                return Err(corrupt(format!("duplicate path {}", child_path)));
            }
            let child_doc = doc
                .structure
                .get(&child_path)
                .ok_or_else(|| corrupt(format!("missing structure entry for {}", child_path)))?;
            match (marker.kind, child_doc) {
                (EntryKind::Folder, NodeDocument::Folder { created, .. }) => {
                    let id = drive.alloc(NodeRecord::folder(child_path, Some(folder_id), *created));
                    drive.push_child(folder_id, id);
                    pending.push(id);
                }
                (
                    EntryKind::File,
                    NodeDocument::File {
                        content,
                        size,
                        created,
                        modified,
                        shared_by,
                        shared_date,
                    },
                ) => {
                    if *size != content.len() as u64 {
                        return Err(corrupt(format!(
                            "size of {} does not match its content",
                            child_path
                        )));
                    }
                    let data = FileData {
                        content: content.clone(),
                        size: *size,
                        created: *created,
                        modified: *modified,
                        shared_by: shared_by.clone(),
                        shared_date: *shared_date,
                    };
                    let id = drive.alloc(NodeRecord::file(child_path, folder_id, data));
                    drive.push_child(folder_id, id);
                }
                _ => {
                    return Err(corrupt(format!(
                        "child marker for {} does not match its structure entry",
                        child_path
                    )))
                }
            }
            visited += 1;
        }
    }

    if visited != doc.structure.len() {
        return Err(corrupt("orphan structure entries"));
    }
    if drive.reachable_size() != doc.current_size {
        return Err(corrupt("currentSize does not match reachable file sizes"));
    }
    Ok(drive)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn populated_store() -> NamespaceStore {
        let store = NamespaceStore::new()
            .create_drive("alice", 1000)
            .unwrap()
            .create_drive("bob", 500)
            .unwrap();
        let store = store.create_folder("alice", "/", "docs", false).unwrap();
        let store = store.create_folder("alice", "/docs", "notes", false).unwrap();
        let store = store
            .create_file("alice", "/docs/notes", "a", "txt", "hello", false)
            .unwrap();
        let store = store
            .create_file("alice", "/", "readme", "md", "# hi", false)
            .unwrap();
        store.share_item("alice", "/", "readme.md", "bob").unwrap()
    }

    #[test]
    fn test_round_trip_is_lossless() {
        let store = populated_store();
        let doc = store.to_document();
        let decoded = NamespaceStore::from_document(&doc).unwrap();
        assert_eq!(decoded.to_document(), doc);
    }

    #[test]
    fn test_round_trip_through_json_text() {
        let doc = populated_store().to_document();
        let text = serde_json::to_string(&doc).unwrap();
        let reparsed: NamespaceDocument = serde_json::from_str(&text).unwrap();
        assert_eq!(reparsed, doc);
    }

    #[test]
    fn test_wire_shape_field_names() {
        let doc = populated_store().to_document();
        let value = serde_json::to_value(&doc).unwrap();
        let alice = &value["alice"];
        assert!(alice["maxSize"].is_u64());
        assert!(alice["currentSize"].is_u64());
        assert_eq!(alice["structure"]["/"]["type"], "folder");
        assert_eq!(alice["structure"]["/docs/notes/a.txt"]["type"], "file");
        assert_eq!(alice["structure"]["/"]["children"]["docs"]["type"], "folder");
        let bob_share = &value["bob"]["structure"]["/shared/readme.md"];
        assert_eq!(bob_share["sharedBy"], "alice");
        assert!(bob_share["sharedDate"].is_string());
        // Unshared files omit the share provenance fields entirely.
        let plain = &value["alice"]["structure"]["/readme.md"];
        assert!(plain.get("sharedBy").is_none());
    }

    #[test]
    fn test_decode_rejects_missing_child_entry() {
        let mut doc = populated_store().to_document();
        doc.get_mut("alice").unwrap().structure.shift_remove("/docs/notes");
        let err = NamespaceStore::from_document(&doc).unwrap_err();
        assert!(matches!(err, DriveError::CorruptDocument(_)));
    }

    #[test]
    fn test_decode_rejects_orphan_entry() {
        let mut doc = populated_store().to_document();
        doc.get_mut("alice").unwrap().structure.insert(
            "/stray".to_string(),
            NodeDocument::Folder {
                children: IndexMap::new(),
                created: Utc::now(),
            },
        );
        let err = NamespaceStore::from_document(&doc).unwrap_err();
        assert!(matches!(err, DriveError::CorruptDocument(_)));
    }

    #[test]
    fn test_decode_rejects_size_mismatch() {
        let mut doc = populated_store().to_document();
        if let Some(NodeDocument::File { size, .. }) = doc
            .get_mut("alice")
            .unwrap()
            .structure
            .get_mut("/docs/notes/a.txt")
        {
            *size += 1;
        }
        let err = NamespaceStore::from_document(&doc).unwrap_err();
        assert!(matches!(err, DriveError::CorruptDocument(_)));
    }

    #[test]
    fn test_decode_rejects_missing_shared() {
        let mut doc = populated_store().to_document();
        let bob = doc.get_mut("bob").unwrap();
        bob.structure.shift_remove("/shared");
        bob.structure.shift_remove("/shared/readme.md");
        bob.current_size = 0;
        let err = NamespaceStore::from_document(&doc).unwrap_err();
        assert!(matches!(err, DriveError::CorruptDocument(_)));
    }

    #[test]
    fn test_decode_rejects_stale_accounting() {
        let mut doc = populated_store().to_document();
        doc.get_mut("alice").unwrap().current_size += 7;
        let err = NamespaceStore::from_document(&doc).unwrap_err();
        assert!(matches!(err, DriveError::CorruptDocument(_)));
    }

    #[test]
    fn test_empty_document_decodes_to_empty_store() {
        let doc = NamespaceDocument::new();
        let store = NamespaceStore::from_document(&doc).unwrap();
        assert_eq!(store.owners().count(), 0);
    }
}
