//! SQLite-backed cache stores.
//!
//! This module provides the store registry the agent owns: named stores,
//! grouped by generation, holding buffered responses keyed by request
//! identity. It supports:
//!
//! - Generation-derived store naming (`<namespace>-<version>-<purpose>`)
//! - Enumerating and deleting whole stores
//! - Atomic single-entry upserts and all-or-nothing batch writes
//! - An optional per-entry byte quota

pub mod connection;
pub mod generation;
pub mod hash;
pub mod migrations;
pub mod storage;
pub mod stores;

pub use crate::Error;

pub use connection::CacheDb;
pub use generation::{Generation, StoreNames, StorePurpose};
pub use storage::CacheStorage;
pub use stores::StoreStats;
