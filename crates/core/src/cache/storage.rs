//! Store registry abstraction.
//!
//! The agent owns one registry, injected at construction. Stores are named,
//! enumerable and deletable as a unit; entries inside a store are keyed by
//! request identity.

use async_trait::async_trait;

use crate::Error;
use crate::http::{AgentRequest, AgentResponse};

/// Named, durable request → response stores.
///
/// Writing to a store that was never opened creates it. A single `put` either
/// replaces the entry wholesale or leaves the previous one in place.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Create the store if it does not exist.
    async fn open_store(&self, name: &str) -> Result<(), Error>;

    /// Names of every existing store, in creation order.
    async fn store_names(&self) -> Result<Vec<String>, Error>;

    /// Delete a store and all of its entries. Returns false if no such store existed.
    async fn delete_store(&self, name: &str) -> Result<bool, Error>;

    /// Look up the entry stored for `request` in `store`.
    async fn lookup(&self, store: &str, request: &AgentRequest) -> Result<Option<AgentResponse>, Error>;

    /// Store `response` under `request`, replacing any previous entry.
    async fn put(&self, store: &str, request: &AgentRequest, response: &AgentResponse) -> Result<(), Error>;

    /// Store every pair, or none of them.
    async fn put_all(&self, store: &str, entries: &[(AgentRequest, AgentResponse)]) -> Result<(), Error>;
}
