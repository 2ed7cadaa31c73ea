//! MCP tool implementations.
//!
//! Each tool takes the shared [`AppState`](crate::state::AppState) and
//! returns its output as pretty-printed JSON text content.

pub mod agent;
pub mod cache;
pub mod notify;

pub use agent::{AgentFetchParams, AgentRegisterParams};
pub use cache::{CachePurgeParams, CacheStoresParams};
pub use notify::{NotificationClickParams, PushDeliverParams};

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;
use wayside_core::Error;

pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
