//! Minimal test MCP server with a single `test_tool` tool.
//!
//! Instead of echoing plain text, `test_tool` reports what it received as a
//! JSON document (see [`TestToolReport`]), which makes it handy for checking
//! argument passing end to end from an MCP client.

use crate::types::{TestToolParams, TestToolReport};
use codebase_mcp_core::ToolName;
use rmcp::handler::server::ServerHandler;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, ServerInfo};
use rmcp::{ErrorData as McpError, tool, tool_handler, tool_router};

/// Name under which the test tool is registered.
pub const TOOL_NAME: &str = "test_tool";

/// MCP service exposing exactly one tool, `test_tool`.
#[derive(Debug, Clone)]
pub struct TestToolService {
    tool_router: ToolRouter<Self>,
}

impl TestToolService {
    /// Creates a new test tool service.
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

impl Default for TestToolService {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_router]
impl TestToolService {
    /// Report the received message as JSON.
    #[tool(description = "Test tool that reports the received message as a JSON document")]
    async fn test_tool(
        &self,
        Parameters(params): Parameters<TestToolParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(tool = TOOL_NAME, "tool called");

        let report = TestToolReport::for_message(params.message);
        let body = serde_json::to_string(&report).map_err(|e| {
            McpError::internal_error(format!("Failed to serialize result: {e}"), None)
        })?;

        Ok(CallToolResult::success(vec![Content::text(body)]))
    }
}

#[tool_handler]
impl ServerHandler for TestToolService {
    fn get_info(&self) -> ServerInfo {
        crate::server_info(
            "Minimal test MCP server. Call test_tool with a message to get a JSON report back.",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn call(message: &str) -> TestToolReport {
        let service = TestToolService::new();
        let result = service
            .test_tool(Parameters(TestToolParams {
                message: message.to_string(),
            }))
            .await
            .unwrap();

        assert_eq!(result.content.len(), 1);
        let text = &result.content[0].as_text().unwrap().text;
        serde_json::from_str(text).unwrap()
    }

    #[tokio::test]
    async fn test_test_tool_reports_message() {
        let report = call("hello world").await;

        assert_eq!(report.status, "success");
        assert_eq!(report.tool, TOOL_NAME);
        assert_eq!(report.message, "hello world");
        assert_eq!(report.message_length, 11);
    }

    #[tokio::test]
    async fn test_test_tool_preserves_json_sensitive_characters() {
        let message = r#"{"nested": "quotes \" and \\ backslashes"}"#;
        let report = call(message).await;
        assert_eq!(report.message, message);
    }

    #[test]
    fn test_tool_list_is_exactly_test_tool() {
        let service = TestToolService::new();
        assert_eq!(service.tool_names(), vec![ToolName::from(TOOL_NAME)]);
    }

    #[test]
    fn test_get_info_advertises_tools_only() {
        let info = TestToolService::default().get_info();

        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.prompts.is_none());
        assert!(
            info.instructions
                .as_deref()
                .is_some_and(|i| i.contains("test_tool"))
        );
    }
}
