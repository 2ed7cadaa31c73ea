//! cache_stores tool implementation.
//!
//! Lists every named store with its entry count and body size.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use wayside_core::StoreStats;

use crate::state::AppState;
use crate::tools::json_result;

/// Parameters for the cache_stores tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CacheStoresParams {}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StoreEntry {
    #[serde(flatten)]
    pub stats: StoreStats,
    /// Whether the store belongs to the generation now serving.
    pub active: bool,
}

/// Output from the cache_stores tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheStoresOutput {
    /// Tag of the generation now serving, if one is registered.
    pub generation: Option<String>,
    pub stores: Vec<StoreEntry>,
}

/// Implementation of the cache_stores tool.
pub async fn stores_impl(state: &AppState, _params: CacheStoresParams) -> Result<CallToolResult, McpError> {
    let active = state.registration.active().await;
    let current = active.as_ref().map(|agent| agent.interceptor().stores().clone());

    let stores = state
        .db
        .store_stats()
        .await?
        .into_iter()
        .map(|stats| {
            let active = current.as_ref().is_some_and(|names| names.contains(&stats.name));
            StoreEntry { stats, active }
        })
        .collect();

    let output = CacheStoresOutput { generation: active.map(|agent| agent.generation().tag()), stores };
    json_result(&output)
}
