//! agent_fetch and agent_register tool implementations.
//!
//! `agent_fetch` offers a request to the serving generation. Requests the
//! agent declines are forwarded to the network directly and never cached.

use std::collections::BTreeMap;

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use wayside_client::{Interception, fetch::resolve};
use wayside_core::{AgentRequest, AgentResponse, Error, RequestMode};

use super::json_result;
use crate::state::AppState;

/// Parameters for the agent_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AgentFetchParams {
    /// Absolute URL, or a path resolved against the configured origin.
    pub url: String,

    /// HTTP method (default: GET).
    #[serde(default = "default_method")]
    pub method: String,

    /// Request mode: "navigate", "same-origin", "no-cors" or "cors" (default).
    #[serde(default)]
    pub mode: RequestMode,

    /// Extra request headers.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

fn default_method() -> String {
    "GET".into()
}

/// Output from the agent_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AgentFetchOutput {
    pub url: String,
    /// False when the agent declined the request and it went straight to the network.
    pub intercepted: bool,
    pub route: Option<String>,
    pub strategy: Option<String>,
    /// "network", "cache", "fallback" or "synthesized".
    pub source: String,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl AgentFetchOutput {
    fn new(url: String, response: AgentResponse) -> Self {
        Self {
            url,
            intercepted: false,
            route: None,
            strategy: None,
            source: "network".into(),
            status: response.status,
            body: response.text(),
            headers: response.headers,
        }
    }
}

/// Implementation of the agent_fetch tool.
pub async fn fetch_impl(state: &AppState, params: AgentFetchParams) -> Result<CallToolResult, McpError> {
    let url = resolve(&params.url, &state.config.origin).map_err(|e| Error::InvalidUrl(e.to_string()))?;
    let method = params.method.trim().to_ascii_uppercase();
    if method.is_empty() {
        return Err(Error::InvalidInput("method must not be empty".into()).into());
    }

    let request = params
        .headers
        .into_iter()
        .fold(AgentRequest::new(method, url).with_mode(params.mode), |request, (name, value)| {
            request.with_header(name, value)
        });

    let output = match state.registration.handle(&request).await {
        Interception::Respond { route, strategy, served } => AgentFetchOutput {
            intercepted: true,
            route: Some(route.to_string()),
            strategy: Some(strategy.to_string()),
            source: served.source.to_string(),
            ..AgentFetchOutput::new(request.url.to_string(), served.response)
        },
        Interception::Passthrough => {
            let response = state.fetcher.fetch(&request).await?;
            AgentFetchOutput::new(request.url.to_string(), response)
        }
    };

    json_result(&output)
}

/// Parameters for the agent_register tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AgentRegisterParams {
    /// Version of the new generation, e.g. "v2".
    pub version: String,
}

/// Implementation of the agent_register tool.
///
/// Installs the new generation and, only if that succeeds, activates it.
pub async fn register_impl(state: &AppState, params: AgentRegisterParams) -> Result<CallToolResult, McpError> {
    let agent = state.agent(&params.version)?;
    let report = state.registration.register(agent).await?;
    json_result(&report)
}
