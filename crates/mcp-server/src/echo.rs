//! Ultra-minimal MCP server with a single `echo` tool.
//!
//! The tool returns its `message` argument verbatim, prefixed with
//! `"Echo: "`, as one text content block.

use crate::types::EchoParams;
use codebase_mcp_core::ToolName;
use rmcp::handler::server::ServerHandler;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, ServerInfo};
use rmcp::{ErrorData as McpError, tool, tool_handler, tool_router};

/// Name under which the echo tool is registered.
pub const TOOL_NAME: &str = "echo";

/// Prefix prepended to every echoed message.
pub const ECHO_PREFIX: &str = "Echo: ";

/// MCP service exposing exactly one tool, `echo`.
///
/// # Examples
///
/// ```no_run
/// use codebase_mcp_server::EchoService;
/// use rmcp::ServiceExt;
/// use rmcp::transport::stdio;
///
/// # async fn example() -> anyhow::Result<()> {
/// let service = EchoService::new().serve(stdio()).await?;
/// service.waiting().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct EchoService {
    tool_router: ToolRouter<Self>,
}

impl EchoService {
    /// Creates a new echo service.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tool_router: Self::tool_router(),
        }
    }

    /// Names of the registered tools, in registration order.
    #[must_use]
    pub fn tool_names(&self) -> Vec<ToolName> {
        self.tool_router
            .list_all()
            .into_iter()
            .map(|tool| ToolName::new(tool.name))
            .collect()
    }
}

impl Default for EchoService {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_router]
impl EchoService {
    /// Echo the message back to the caller.
    #[tool(description = "Echo the given message back, prefixed with 'Echo: '")]
    async fn echo(
        &self,
        Parameters(params): Parameters<EchoParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(len = params.message.len(), "echo called");

        Ok(CallToolResult::success(vec![Content::text(format!(
            "{ECHO_PREFIX}{}",
            params.message
        ))]))
    }
}

#[tool_handler]
impl ServerHandler for EchoService {
    fn get_info(&self) -> ServerInfo {
        crate::server_info("Ultra-minimal MCP server. Call echo with a message to get it back.")
    }
}
