//! Core types for the drive namespace engine.

use chrono::{DateTime, Utc};

/// NodeId: Stable identifier of a namespace node (file or folder) within one drive
pub type NodeId = u64;

/// OwnerName: Drive owner identifier; doubles as login and namespace key
pub type OwnerName = String;

/// Timestamp: UTC instant, serialized as ISO-8601
pub type Timestamp = DateTime<Utc>;
