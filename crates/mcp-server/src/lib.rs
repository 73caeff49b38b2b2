//! Minimal example MCP servers over stdio.
//!
//! Two independent services, each shipped as its own binary:
//!
//! 1. **`ultra-minimal-server`** ([`EchoService`]) - one tool, `echo`, which
//!    returns `"Echo: <message>"`
//! 2. **`minimal-test-server`** ([`TestToolService`]) - one tool,
//!    `test_tool`, which returns a JSON report of the received message
//!
//! Both advertise the tools capability only and serve until the client
//! closes stdin.
//!
//! # Examples
//!
//! Configure in an MCP client:
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "echo": { "command": "ultra-minimal-server" }
//!   }
//! }
//! ```

pub mod echo;
pub mod logging;
pub mod test_tool;
pub mod types;

pub use echo::EchoService;
pub use test_tool::TestToolService;
pub use types::{EchoParams, TestToolParams, TestToolReport};

use rmcp::ServiceExt;
use rmcp::handler::server::ServerHandler;
use rmcp::model::{Implementation, ProtocolVersion, ServerCapabilities, ServerInfo};
use rmcp::transport::stdio;

/// Serves `service` over stdin/stdout until the client disconnects.
///
/// # Errors
///
/// Returns an error if the MCP handshake fails or the service task panics.
pub async fn serve_stdio<S: ServerHandler>(service: S) -> anyhow::Result<()> {
    let running = service.serve(stdio()).await?;
    let reason = running.waiting().await?;
    tracing::debug!(?reason, "service stopped");
    Ok(())
}

/// Server info shared by both example servers.
pub(crate) fn server_info(instructions: &str) -> ServerInfo {
    ServerInfo {
        protocol_version: ProtocolVersion::V_2024_11_05,
        capabilities: ServerCapabilities::builder().enable_tools().build(),
        server_info: Implementation::from_build_env(),
        instructions: Some(instructions.to_string()),
    }
}
