//! Drivespace: Virtual Multi-Tenant Drive Namespace Engine
//!
//! An in-memory hierarchical namespace of named drives, each holding a tree of
//! folders and files addressed by absolute path, with quota-checked mutation
//! and wholesale snapshot persistence to a remote JSON store.

pub mod config;
pub mod document;
pub mod drive;
pub mod error;
pub mod logging;
pub mod node;
pub mod path;
pub mod persistence;
pub mod service;
pub mod session;
pub mod store;
pub mod types;
