//! cache_purge tool implementation.
//!
//! Deletes one named store and every entry in it.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use wayside_core::Error;

use crate::state::AppState;
use crate::tools::json_result;

/// Parameters for the cache_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeParams {
    /// Name of the store to delete, e.g. "community-v1-api".
    pub store: String,
}

/// Output from the cache_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeOutput {
    pub store: String,
    /// False if no store had that name.
    pub deleted: bool,
}

/// Implementation of the cache_purge tool.
pub async fn purge_impl(state: &AppState, params: CachePurgeParams) -> Result<CallToolResult, McpError> {
    let store = params.store.trim();
    if store.is_empty() {
        return Err(Error::InvalidInput("store must not be empty".to_string()).into());
    }

    let deleted = state.db.drop_store(store).await?;
    tracing::info!(store, deleted, "purged store");

    json_result(&CachePurgeOutput { store: store.to_string(), deleted })
}
