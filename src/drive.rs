//! Single-drive namespace tree.
//!
//! One `Drive` owns an arena of node records addressed by stable `NodeId`,
//! plus a path-to-identifier index kept in lockstep on every mutation. Each
//! folder holds an insertion-ordered list of child ids, so listing is O(1)
//! per entry and full-path lookup is O(1) through the index.
//!
//! Every operation validates first and mutates only on success; a rejected
//! call leaves the drive untouched. Recursive deletion and subtree path
//! rewriting iterate over an id snapshot collected before any mutation.

use crate::error::DriveError;
use crate::node::{EntryKind, FileData, NodeKind, NodeRecord, NodeSummary};
use crate::path;
use crate::types::{NodeId, Timestamp};
use std::collections::HashMap;

/// One drive: quota bookkeeping plus the node arena and path index.
#[derive(Debug, Clone)]
pub struct Drive {
    pub(crate) max_size: u64,
    pub(crate) current_size: u64,
    pub(crate) nodes: HashMap<NodeId, NodeRecord>,
    pub(crate) paths: HashMap<String, NodeId>,
    pub(crate) root: NodeId,
    pub(crate) shared: NodeId,
    pub(crate) next_id: NodeId,
}

impl Drive {
    /// Create an empty drive with the given quota.
    ///
    /// Installs the root folder and the `/shared` inbox. The inbox is a
    /// sibling root rather than a child of `/`, so it never shows up in
    /// listings and cannot be deleted or moved through its parent.
    pub fn new(max_size: u64, now: Timestamp) -> Self {
        let mut drive = Drive {
            max_size,
            current_size: 0,
            nodes: HashMap::new(),
            paths: HashMap::new(),
            root: 0,
            shared: 0,
            next_id: 0,
        };
        drive.root = drive.alloc(NodeRecord::folder(path::ROOT.to_string(), None, now));
        drive.shared = drive.alloc(NodeRecord::folder(path::SHARED.to_string(), None, now));
        drive
    }

    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    pub fn current_size(&self) -> u64 {
        self.current_size
    }

    /// Whether any node occupies `path`.
    pub fn has_path(&self, p: &str) -> bool {
        self.paths.contains_key(p)
    }

    /// Kind of the node at `path`, if present.
    pub fn kind_at(&self, p: &str) -> Option<EntryKind> {
        self.paths.get(p).map(|id| self.record(*id).entry_kind())
    }

    /// Insertion-ordered listing of the folder at `dir`.
    pub fn list_children(&self, dir: &str) -> Result<Vec<(String, NodeSummary)>, DriveError> {
        let folder = self.folder_at(dir)?;
        let entries = match &self.record(folder).kind {
            NodeKind::Folder { children, .. } => children
                .iter()
                .map(|&child| {
                    let record = self.record(child);
                    (path::leaf(&record.path).to_string(), NodeSummary::of(record))
                })
                .collect(),
            NodeKind::File(_) => Vec::new(),
        };
        Ok(entries)
    }

    /// Read the file named `name` inside `dir`.
    pub fn read_file(&self, dir: &str, name: &str) -> Result<&FileData, DriveError> {
        let parent = self.folder_at(dir)?;
        let id = self
            .existing_child(parent, name)
            .ok_or_else(|| DriveError::NotFound(format!("no file named {} in {}", name, dir)))?;
        self.record(id)
            .as_file()
            .ok_or_else(|| DriveError::NotFound(format!("no file named {} in {}", name, dir)))
    }

    /// Create `name` inside `dir`, or overwrite an existing file of that name.
    ///
    /// Overwrite is quota-checked on the size delta, refreshes `modified`,
    /// and preserves the original `created`.
    pub fn create_file(
        &mut self,
        dir: &str,
        name: &str,
        content: String,
        overwrite: bool,
        now: Timestamp,
    ) -> Result<(), DriveError> {
        if !path::valid_name(name) {
            return Err(DriveError::InvalidArgument(format!("invalid file name: {:?}", name)));
        }
        let parent = self.folder_at(dir)?;
        self.ensure_writable_target(dir)?;
        let size = content.len() as u64;
        if let Some(id) = self.existing_child(parent, name) {
            if self.record(id).is_folder() {
                return Err(DriveError::InvalidOperation(format!(
                    "a folder named {} already exists in {}",
                    name, dir
                )));
            }
            if !overwrite {
                return Err(DriveError::AlreadyExists(path::join(dir, name)));
            }
            return self.replace_file_content(id, content, now);
        }
        self.ensure_quota(size)?;
        let full = self.child_path(parent, name);
        self.ensure_not_reserved(&full)?;
        let id = self.alloc(NodeRecord::file(full, parent, FileData::new(content, now)));
        self.push_child(parent, id);
        self.current_size += size;
        Ok(())
    }

    /// Replace the content of an existing file (edit-in-place).
    pub fn write_file(
        &mut self,
        dir: &str,
        name: &str,
        content: String,
        now: Timestamp,
    ) -> Result<(), DriveError> {
        let parent = self.folder_at(dir)?;
        self.ensure_writable_target(dir)?;
        let id = self
            .existing_child(parent, name)
            .ok_or_else(|| DriveError::NotFound(format!("no file named {} in {}", name, dir)))?;
        self.replace_file_content(id, content, now)
    }

    /// Create a folder `name` inside `dir`.
    ///
    /// With `overwrite`, an existing folder of that name is replaced by a
    /// fresh empty one: its whole subtree is removed with full quota
    /// accounting and the replacement gets a fresh `created`.
    pub fn create_folder(
        &mut self,
        dir: &str,
        name: &str,
        overwrite: bool,
        now: Timestamp,
    ) -> Result<(), DriveError> {
        if !path::valid_name(name) {
            return Err(DriveError::InvalidArgument(format!("invalid folder name: {:?}", name)));
        }
        let parent = self.folder_at(dir)?;
        self.ensure_writable_target(dir)?;
        let full = self.child_path(parent, name);
        self.ensure_not_reserved(&full)?;
        if let Some(id) = self.existing_child(parent, name) {
            if !overwrite {
                return Err(DriveError::AlreadyExists(full));
            }
            if !self.record(id).is_folder() {
                return Err(DriveError::InvalidOperation(format!(
                    "a file named {} already exists in {}",
                    name, dir
                )));
            }
            self.detach_child(parent, id);
            self.remove_subtree(id);
        }
        let id = self.alloc(NodeRecord::folder(full, Some(parent), now));
        self.push_child(parent, id);
        Ok(())
    }

    /// Delete the file named `name` inside `dir`.
    pub fn delete_file(&mut self, dir: &str, name: &str) -> Result<(), DriveError> {
        let parent = self.folder_at(dir)?;
        let id = self
            .existing_child(parent, name)
            .filter(|&id| !self.record(id).is_folder())
            .ok_or_else(|| DriveError::NotFound(format!("no file named {} in {}", name, dir)))?;
        self.detach_child(parent, id);
        self.remove_subtree(id);
        Ok(())
    }

    /// Delete the folder named `name` inside `dir` and its whole subtree.
    ///
    /// The `/shared` inbox is not a child of root, so it can never be
    /// reached here; the lookup fails with `NotFound`.
    pub fn delete_folder(&mut self, dir: &str, name: &str) -> Result<(), DriveError> {
        let parent = self.folder_at(dir)?;
        let id = self
            .existing_child(parent, name)
            .filter(|&id| self.record(id).is_folder())
            .ok_or_else(|| DriveError::NotFound(format!("no folder named {} in {}", name, dir)))?;
        self.detach_child(parent, id);
        self.remove_subtree(id);
        Ok(())
    }

    /// Copy the file `name` from `source` into `target`.
    ///
    /// The copy gets a fresh `created` and preserves content, size, and
    /// `modified`. Overwriting an existing file at the target is quota-checked
    /// on the size delta.
    pub fn copy_file(
        &mut self,
        source: &str,
        target: &str,
        name: &str,
        overwrite: bool,
        now: Timestamp,
    ) -> Result<(), DriveError> {
        if source == target {
            return Err(DriveError::InvalidArgument(
                "source and target folders are the same".to_string(),
            ));
        }
        let src_parent = self.folder_at(source)?;
        let tgt_parent = self.folder_at(target)?;
        self.ensure_writable_target(target)?;
        let src_id = self
            .existing_child(src_parent, name)
            .filter(|&id| !self.record(id).is_folder())
            .ok_or_else(|| DriveError::NotFound(format!("no file named {} in {}", name, source)))?;
        let mut data = match self.record(src_id).as_file() {
            Some(data) => data.clone(),
            None => return Err(DriveError::NotFound(format!("no file named {} in {}", name, source))),
        };
        data.created = now;
        let size = data.size;
        if let Some(existing) = self.existing_child(tgt_parent, name) {
            if !overwrite {
                return Err(DriveError::AlreadyExists(path::join(target, name)));
            }
            let old_size = match self.record(existing).as_file() {
                Some(old) => old.size,
                None => {
                    return Err(DriveError::InvalidOperation(format!(
                        "a folder named {} already exists in {}",
                        name, target
                    )))
                }
            };
            if size > old_size {
                self.ensure_quota(size - old_size)?;
            }
            if let Some(record) = self.nodes.get_mut(&existing) {
                record.kind = NodeKind::File(data);
            }
            self.current_size = self.current_size - old_size + size;
            return Ok(());
        }
        self.ensure_quota(size)?;
        let full = self.child_path(tgt_parent, name);
        self.ensure_not_reserved(&full)?;
        let id = self.alloc(NodeRecord::file(full, tgt_parent, data));
        self.push_child(tgt_parent, id);
        self.current_size += size;
        Ok(())
    }

    /// Move the entry `name` from `source` into `target`.
    ///
    /// Folders may not move into themselves or a descendant. Folder moves
    /// rewrite every descendant path; the rewrite runs over an id snapshot
    /// collected before any index insertion.
    pub fn move_item(
        &mut self,
        source: &str,
        target: &str,
        name: &str,
        overwrite: bool,
    ) -> Result<(), DriveError> {
        if source == target {
            return Err(DriveError::InvalidArgument(
                "source and target folders are the same".to_string(),
            ));
        }
        let src_parent = self.folder_at(source)?;
        let tgt_parent = self.folder_at(target)?;
        self.ensure_writable_target(target)?;
        let item = self
            .existing_child(src_parent, name)
            .ok_or_else(|| DriveError::NotFound(format!("no entry named {} in {}", name, source)))?;
        let item_path = self.record(item).path.clone();
        if self.record(item).is_folder()
            && (target == item_path || path::is_strict_descendant(&item_path, target))
        {
            return Err(DriveError::InvalidOperation(format!(
                "cannot move {} into itself or a descendant",
                item_path
            )));
        }
        let new_path = path::join(target, name);
        self.ensure_not_reserved(&new_path)?;
        if let Some(existing) = self.existing_child(tgt_parent, name) {
            if !overwrite {
                return Err(DriveError::AlreadyExists(new_path));
            }
            self.detach_child(tgt_parent, existing);
            self.remove_subtree(existing);
        }
        self.detach_child(src_parent, item);
        self.push_child(tgt_parent, item);
        if let Some(record) = self.nodes.get_mut(&item) {
            record.parent = Some(tgt_parent);
        }
        let subtree = self.subtree_ids(item);
        for id in subtree {
            let old = self.record(id).path.clone();
            let renamed = path::reparent(&old, &item_path, &new_path);
            self.paths.remove(&old);
            if let Some(record) = self.nodes.get_mut(&id) {
                record.path = renamed.clone();
            }
            self.paths.insert(renamed, id);
        }
        Ok(())
    }

    /// Write a shared copy into the `/shared` inbox.
    ///
    /// An existing file share under the same name is replaced with delta
    /// accounting; a folder under that name rejects the share. Quota is
    /// deliberately not enforced here; `current_size` is still adjusted so
    /// the size invariant holds.
    pub fn insert_shared(&mut self, name: &str, data: FileData) -> Result<(), DriveError> {
        if !path::valid_name(name) {
            return Err(DriveError::InvalidArgument(format!("invalid file name: {:?}", name)));
        }
        let shared = self.shared;
        let size = data.size;
        if let Some(id) = self.existing_child(shared, name) {
            let old_size = match self.record(id).as_file() {
                Some(old) => old.size,
                None => {
                    return Err(DriveError::InvalidOperation(format!(
                        "a folder named {} already exists in {}",
                        name,
                        path::SHARED
                    )))
                }
            };
            if let Some(record) = self.nodes.get_mut(&id) {
                record.kind = NodeKind::File(data);
            }
            self.current_size = self.current_size - old_size + size;
        } else {
            let full = path::join(path::SHARED, name);
            let id = self.alloc(NodeRecord::file(full, shared, data));
            self.push_child(shared, id);
            self.current_size += size;
        }
        Ok(())
    }

    /// All folder paths except the `/shared` inbox, sorted lexicographically.
    ///
    /// Used to populate copy/move destination choices.
    pub fn folder_paths(&self) -> Vec<String> {
        let mut out: Vec<String> = self
            .nodes
            .values()
            .filter(|record| record.is_folder())
            .map(|record| record.path.clone())
            .filter(|p| p != path::SHARED && !path::is_strict_descendant(path::SHARED, p))
            .collect();
        out.sort();
        out
    }

    /// Sum of file sizes reachable from `/` and `/shared`.
    ///
    /// Always equals `current_size` after an accepted mutation.
    pub fn reachable_size(&self) -> u64 {
        let mut total = 0;
        let mut stack = vec![self.root, self.shared];
        while let Some(id) = stack.pop() {
            match &self.record(id).kind {
                NodeKind::Folder { children, .. } => stack.extend(children.iter().copied()),
                NodeKind::File(data) => total += data.size,
            }
        }
        total
    }

    // --- internals ---

    pub(crate) fn record(&self, id: NodeId) -> &NodeRecord {
        &self.nodes[&id]
    }

    pub(crate) fn alloc(&mut self, record: NodeRecord) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        self.paths.insert(record.path.clone(), id);
        self.nodes.insert(id, record);
        id
    }

    pub(crate) fn push_child(&mut self, parent: NodeId, child: NodeId) {
        if let Some(NodeKind::Folder { children, .. }) =
            self.nodes.get_mut(&parent).map(|r| &mut r.kind)
        {
            children.push(child);
        }
    }

    fn detach_child(&mut self, parent: NodeId, child: NodeId) {
        if let Some(NodeKind::Folder { children, .. }) =
            self.nodes.get_mut(&parent).map(|r| &mut r.kind)
        {
            children.retain(|&c| c != child);
        }
    }

    fn folder_at(&self, dir: &str) -> Result<NodeId, DriveError> {
        let id = self
            .paths
            .get(dir)
            .copied()
            .ok_or_else(|| DriveError::NotFound(format!("no folder at {}", dir)))?;
        if self.record(id).is_folder() {
            Ok(id)
        } else {
            Err(DriveError::NotFound(format!("no folder at {}", dir)))
        }
    }

    /// Resolve `name` as a direct child of `parent` via the path index,
    /// confirming the parent link so sibling roots (the inbox) never match.
    fn existing_child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        let full = self.child_path(parent, name);
        let id = self.paths.get(&full).copied()?;
        (self.record(id).parent == Some(parent)).then_some(id)
    }

    fn child_path(&self, parent: NodeId, name: &str) -> String {
        path::join(&self.record(parent).path, name)
    }

    fn ensure_quota(&self, added: u64) -> Result<(), DriveError> {
        let available = self.max_size.saturating_sub(self.current_size);
        if added > available {
            return Err(DriveError::QuotaExceeded {
                needed: added,
                available,
            });
        }
        Ok(())
    }

    fn ensure_not_reserved(&self, full: &str) -> Result<(), DriveError> {
        if full == path::SHARED {
            return Err(DriveError::InvalidOperation(format!(
                "{} is reserved for shared items",
                path::SHARED
            )));
        }
        Ok(())
    }

    /// The `/shared` inbox only receives items through `insert_shared`; it is
    /// never a valid destination for creates, edits, copies, or moves.
    fn ensure_writable_target(&self, target: &str) -> Result<(), DriveError> {
        if target == path::SHARED || path::is_strict_descendant(path::SHARED, target) {
            return Err(DriveError::InvalidOperation(format!(
                "{} only accepts items through sharing",
                path::SHARED
            )));
        }
        Ok(())
    }

    fn replace_file_content(
        &mut self,
        id: NodeId,
        content: String,
        now: Timestamp,
    ) -> Result<(), DriveError> {
        let old_size = match self.record(id).as_file() {
            Some(data) => data.size,
            None => {
                return Err(DriveError::InvalidOperation(format!(
                    "{} is a folder",
                    self.record(id).path
                )))
            }
        };
        let size = content.len() as u64;
        if size > old_size {
            self.ensure_quota(size - old_size)?;
        }
        if let Some(NodeKind::File(data)) = self.nodes.get_mut(&id).map(|r| &mut r.kind) {
            data.content = content;
            data.size = size;
            data.modified = now;
        }
        self.current_size = self.current_size - old_size + size;
        Ok(())
    }

    /// Preorder id snapshot of the subtree rooted at `id`, collected before
    /// any mutation so removal or rewriting never visits fresh entries.
    fn subtree_ids(&self, id: NodeId) -> Vec<NodeId> {
        let mut collected = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            collected.push(current);
            if let NodeKind::Folder { children, .. } = &self.record(current).kind {
                stack.extend(children.iter().copied());
            }
        }
        collected
    }

    fn remove_subtree(&mut self, id: NodeId) {
        for removed in self.subtree_ids(id) {
            if let Some(record) = self.nodes.remove(&removed) {
                self.paths.remove(&record.path);
                if let NodeKind::File(data) = record.kind {
                    self.current_size -= data.size;
                }
            }
        }
    }
}
