//! wayside server entry point.
//!
//! Boots the offline cache agent behind an MCP server on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;
use wayside_core::AppConfig;

mod handler;
mod host;
mod state;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(
        generation = %config.generation(),
        origin = %config.origin,
        db = %config.db_path.display(),
        "Starting wayside server on stdio transport"
    );

    let state = Arc::new(state::AppState::open(config).await?);

    let agent = state.agent(&state.config.version)?;
    if let Err(e) = state.registration.register(agent).await {
        tracing::warn!(error = %e, "initial registration failed, passing requests through until one succeeds");
    }

    let handler = handler::WaysideServer::new(state);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
