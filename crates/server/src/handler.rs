//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use crate::state::AppState;
use crate::tools::{
    AgentFetchParams, AgentRegisterParams, CachePurgeParams, CacheStoresParams, NotificationClickParams,
    PushDeliverParams, agent, cache, notify,
};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The MCP server handler for the wayside agent.
#[derive(Clone)]
pub struct WaysideServer {
    tool_router: ToolRouter<Self>,
    state: Arc<AppState>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl WaysideServer {
    /// Create a new server handler over shared state.
    pub fn new(state: Arc<AppState>) -> Self {
        Self { tool_router: Self::tool_router(), state }
    }

    #[tool(
        description = "Send a request through the active agent generation. Returns the route class, strategy, response source, status, headers and body. Requests the agent declines are fetched directly without caching."
    )]
    async fn agent_fetch(&self, params: Parameters<AgentFetchParams>) -> Result<CallToolResult, McpError> {
        agent::fetch_impl(&self.state, params.0).await
    }

    /// Install and activate a new generation.
    ///
    /// The previous generation keeps serving if precaching fails.
    #[tool(
        description = "Register a new agent generation: precache the manifest into its static store, then delete stores of older generations and start serving."
    )]
    async fn agent_register(&self, params: Parameters<AgentRegisterParams>) -> Result<CallToolResult, McpError> {
        agent::register_impl(&self.state, params.0).await
    }

    #[tool(description = "List cache stores with entry counts and body sizes, marking those of the serving generation.")]
    async fn cache_stores(&self, params: Parameters<CacheStoresParams>) -> Result<CallToolResult, McpError> {
        cache::stores_impl(&self.state, params.0).await
    }

    #[tool(description = "Delete one named cache store and all of its entries.")]
    async fn cache_purge(&self, params: Parameters<CachePurgeParams>) -> Result<CallToolResult, McpError> {
        cache::purge_impl(&self.state, params.0).await
    }

    #[tool(
        description = "Deliver a push message. JSON payloads may set title, body, url, tag, actions and renotify; other payloads are shown as text. Returns the displayed notification."
    )]
    async fn push_deliver(&self, params: Parameters<PushDeliverParams>) -> Result<CallToolResult, McpError> {
        notify::deliver_impl(&self.state, params.0).await
    }

    #[tool(
        description = "Handle a notification click: focus the first open view whose URL contains the target, or open a new view."
    )]
    async fn notification_click(&self, params: Parameters<NotificationClickParams>) -> Result<CallToolResult, McpError> {
        notify::click_impl(&self.state, params.0).await
    }
}

impl ServerHandler for WaysideServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "wayside".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
