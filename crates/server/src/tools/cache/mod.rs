//! Cache-related MCP tools.
//!
//! This module provides tools for inspecting and removing named stores.

pub mod purge;
pub mod stores;

pub use purge::{CachePurgeParams, purge_impl};
pub use stores::{CacheStoresParams, stores_impl};
