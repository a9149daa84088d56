//! Explicit session context.
//!
//! The original interaction model kept a global "current user" and "current
//! path"; here that state is an explicit value validated against the store on
//! every navigation, so multiple sessions can coexist and tests need no
//! ambient setup.

use crate::error::DriveError;
use crate::node::EntryKind;
use crate::path::{self, Breadcrumb};
use crate::store::NamespaceStore;
use crate::types::OwnerName;

/// One interactive session: the drive being browsed and the working folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    owner: OwnerName,
    path: String,
}

impl Session {
    /// Enter a drive at its root. Fails `NotFound` for unknown owners.
    pub fn enter(store: &NamespaceStore, owner: &str) -> Result<Self, DriveError> {
        store.drive(owner)?;
        Ok(Session {
            owner: owner.to_string(),
            path: path::ROOT.to_string(),
        })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Descend into the child folder `name` of the working folder.
    pub fn change_dir(&mut self, store: &NamespaceStore, name: &str) -> Result<(), DriveError> {
        let next = path::join(&self.path, name);
        self.navigate_to(store, &next)
    }

    /// Jump to an absolute folder path (breadcrumb navigation).
    pub fn navigate_to(&mut self, store: &NamespaceStore, target: &str) -> Result<(), DriveError> {
        let drive = store.drive(&self.owner)?;
        match drive.kind_at(target) {
            Some(EntryKind::Folder) => {
                self.path = target.to_string();
                Ok(())
            }
            _ => Err(DriveError::NotFound(format!("no folder at {}", target))),
        }
    }

    /// Move to the parent folder; the root is its own parent.
    pub fn up(&mut self) {
        if let Some((parent, _)) = path::split(&self.path) {
            self.path = parent;
        }
    }

    /// Breadcrumbs from the root to the working folder.
    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        path::breadcrumbs(&self.path)
    }
}
