//! Namespace store: the mapping from drive owner to `Drive`.
//!
//! The store is the sole source of truth and follows a snapshot-then-replace
//! model: every mutation validates against the current value, produces a new
//! store value, and leaves `self` untouched. The caller persists the new
//! value and adopts it only once the save succeeds, so a failed save rolls
//! back for free.

use crate::drive::Drive;
use crate::error::DriveError;
use crate::node::{FileData, NodeSummary};
use crate::types::OwnerName;
use chrono::Utc;
use indexmap::IndexMap;

/// All drives, keyed by owner name (login and namespace key in one).
#[derive(Debug, Clone, Default)]
pub struct NamespaceStore {
    pub(crate) drives: IndexMap<OwnerName, Drive>,
}

impl NamespaceStore {
    pub fn new() -> Self {
        NamespaceStore {
            drives: IndexMap::new(),
        }
    }

    /// Owner names in insertion order.
    pub fn owners(&self) -> impl Iterator<Item = &str> {
        self.drives.keys().map(|s| s.as_str())
    }

    pub fn drive(&self, owner: &str) -> Result<&Drive, DriveError> {
        self.drives
            .get(owner)
            .ok_or_else(|| DriveError::NotFound(format!("no drive named {}", owner)))
    }

    /// Install a new drive with an empty namespace.
    pub fn create_drive(&self, owner: &str, max_size: u64) -> Result<Self, DriveError> {
        if owner.is_empty() {
            return Err(DriveError::InvalidArgument("drive name must not be empty".to_string()));
        }
        if max_size == 0 {
            return Err(DriveError::InvalidArgument("drive quota must not be zero".to_string()));
        }
        if self.drives.contains_key(owner) {
            return Err(DriveError::AlreadyExists(format!("drive {}", owner)));
        }
        let mut next = self.clone();
        next.drives.insert(owner.to_string(), Drive::new(max_size, Utc::now()));
        Ok(next)
    }

    /// Insertion-ordered listing of the folder at `dir` in `owner`'s drive.
    pub fn list_children(
        &self,
        owner: &str,
        dir: &str,
    ) -> Result<Vec<(String, NodeSummary)>, DriveError> {
        self.drive(owner)?.list_children(dir)
    }

    /// Read a file for viewing or download.
    pub fn read_file(&self, owner: &str, dir: &str, name: &str) -> Result<&FileData, DriveError> {
        self.drive(owner)?.read_file(dir, name)
    }

    /// Copy/move destination choices for `owner`'s drive.
    pub fn folder_paths(&self, owner: &str) -> Result<Vec<String>, DriveError> {
        Ok(self.drive(owner)?.folder_paths())
    }

    /// Create `name.extension` inside `dir`.
    pub fn create_file(
        &self,
        owner: &str,
        dir: &str,
        name: &str,
        extension: &str,
        content: &str,
        overwrite: bool,
    ) -> Result<Self, DriveError> {
        if name.is_empty() || extension.is_empty() {
            return Err(DriveError::InvalidArgument(
                "file name and extension must not be empty".to_string(),
            ));
        }
        let file_name = format!("{}.{}", name, extension);
        self.mutate(owner, |drive| {
            drive.create_file(dir, &file_name, content.to_string(), overwrite, Utc::now())
        })
    }

    /// Replace an existing file's content (edit-in-place).
    pub fn write_file(
        &self,
        owner: &str,
        dir: &str,
        name: &str,
        content: &str,
    ) -> Result<Self, DriveError> {
        self.mutate(owner, |drive| {
            drive.write_file(dir, name, content.to_string(), Utc::now())
        })
    }

    pub fn create_folder(
        &self,
        owner: &str,
        dir: &str,
        name: &str,
        overwrite: bool,
    ) -> Result<Self, DriveError> {
        self.mutate(owner, |drive| drive.create_folder(dir, name, overwrite, Utc::now()))
    }

    pub fn delete_file(&self, owner: &str, dir: &str, name: &str) -> Result<Self, DriveError> {
        self.mutate(owner, |drive| drive.delete_file(dir, name))
    }

    pub fn delete_folder(&self, owner: &str, dir: &str, name: &str) -> Result<Self, DriveError> {
        self.mutate(owner, |drive| drive.delete_folder(dir, name))
    }

    pub fn copy_file(
        &self,
        owner: &str,
        source: &str,
        target: &str,
        name: &str,
        overwrite: bool,
    ) -> Result<Self, DriveError> {
        self.mutate(owner, |drive| drive.copy_file(source, target, name, overwrite, Utc::now()))
    }

    pub fn move_item(
        &self,
        owner: &str,
        source: &str,
        target: &str,
        name: &str,
        overwrite: bool,
    ) -> Result<Self, DriveError> {
        self.mutate(owner, |drive| drive.move_item(source, target, name, overwrite))
    }

    /// Share the file `name` from `source_owner`'s drive into
    /// `target_owner`'s `/shared` inbox.
    ///
    /// The copy is stamped with the sharing owner and share date; the source
    /// drive's accounting is untouched. The target's quota is not enforced,
    /// matching the established sharing behavior.
    pub fn share_item(
        &self,
        source_owner: &str,
        source_dir: &str,
        name: &str,
        target_owner: &str,
    ) -> Result<Self, DriveError> {
        if !self.drives.contains_key(target_owner) {
            return Err(DriveError::NotFound(format!("no drive named {}", target_owner)));
        }
        let mut data = self.drive(source_owner)?.read_file(source_dir, name)?.clone();
        data.shared_by = Some(source_owner.to_string());
        data.shared_date = Some(Utc::now());
        let mut next = self.clone();
        match next.drives.get_mut(target_owner) {
            Some(drive) => drive.insert_shared(name, data)?,
            None => return Err(DriveError::NotFound(format!("no drive named {}", target_owner))),
        }
        Ok(next)
    }

    /// Clone-then-mutate one drive, returning the new store value.
    fn mutate<F>(&self, owner: &str, op: F) -> Result<Self, DriveError>
    where
        F: FnOnce(&mut Drive) -> Result<(), DriveError>,
    {
        self.drive(owner)?;
        let mut next = self.clone();
        match next.drives.get_mut(owner) {
            Some(drive) => op(drive)?,
            None => return Err(DriveError::NotFound(format!("no drive named {}", owner))),
        }
        Ok(next)
    }
}
