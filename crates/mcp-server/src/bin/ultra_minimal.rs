//! Ultra-minimal MCP server: a single `echo` tool over stdio.
//!
//! # Usage
//!
//! ```bash
//! ultra-minimal-server
//! ```

use anyhow::Result;
use codebase_mcp_server::{EchoService, logging, serve_stdio};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init("info,codebase_mcp_server=debug")?;

    let service = EchoService::new();
    for tool in service.tool_names() {
        tracing::debug!(%tool, "registered tool");
    }
    tracing::info!(
        "Starting ultra-minimal-server v{}",
        env!("CARGO_PKG_VERSION")
    );

    serve_stdio(service).await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}
