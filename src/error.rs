//! Error types for the drive namespace engine.
//!
//! Every validation failure is reported before any mutation is applied;
//! persistence failures leave the prior in-memory snapshot authoritative.

use thiserror::Error;

/// Engine-level errors surfaced by namespace operations.
#[derive(Debug, Error)]
pub enum DriveError {
    /// A drive, path, or entry the operation requires does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// An entry with the same name already exists and overwrite was not requested
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// The mutation would push the drive past its quota
    #[error("quota exceeded: need {needed} bytes, {available} available")]
    QuotaExceeded { needed: u64, available: u64 },

    /// An argument is malformed or self-contradictory (e.g. source == target)
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation is structurally impossible (e.g. folder into itself)
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// A loaded snapshot document violates the namespace invariants
    #[error("corrupt snapshot document: {0}")]
    CorruptDocument(String),

    /// The persistence collaborator failed; the prior snapshot remains current
    #[error("persistence failure: {0}")]
    Persistence(#[from] PersistenceError),
}

/// Errors from the snapshot repository collaborator.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Transport-level failure reaching the snapshot store
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The snapshot store answered with a non-success status
    #[error("snapshot store returned status {0}")]
    Status(u16),

    /// The stored document could not be serialized or deserialized
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
