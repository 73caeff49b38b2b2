//! Minimal test MCP server: a single `test_tool` tool over stdio.

use anyhow::Result;
use codebase_mcp_server::{TestToolService, logging, serve_stdio};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init("info")?;

    let service = TestToolService::new();
    let tools: Vec<String> = service.tool_names().iter().map(ToString::to_string).collect();
    tracing::info!(
        tools = %tools.join(", "),
        "Starting minimal-test-server v{}",
        env!("CARGO_PKG_VERSION")
    );

    serve_stdio(service).await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}
