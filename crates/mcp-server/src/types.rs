//! Parameter and result types for the example tools.
//!
//! - `echo`: echoes `message` back prefixed with `"Echo: "`
//! - `test_tool`: reports the received `message` as a JSON document

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `echo` tool.
///
/// # Examples
///
/// ```
/// use codebase_mcp_server::types::EchoParams;
///
/// let params: EchoParams = serde_json::from_str(r#"{"message": "hi"}"#).unwrap();
/// assert_eq!(params.message, "hi");
/// ```
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct EchoParams {
    /// Text to echo back
    pub message: String,
}

/// Parameters for the `test_tool` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct TestToolParams {
    /// Text to report back
    pub message: String,
}

/// Result body returned by `test_tool`.
///
/// Serialized as the single text content block of the tool result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestToolReport {
    /// Always `"success"` for a handled call
    pub status: String,

    /// Name of the tool that handled the call
    pub tool: String,

    /// The message exactly as received
    pub message: String,

    /// Length of the message in characters
    pub message_length: usize,
}

impl TestToolReport {
    /// Builds the report for a received message.
    ///
    /// # Examples
    ///
    /// ```
    /// use codebase_mcp_server::types::TestToolReport;
    ///
    /// let report = TestToolReport::for_message("héllo");
    /// assert_eq!(report.status, "success");
    /// assert_eq!(report.message_length, 5);
    /// ```
    #[must_use]
    pub fn for_message(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            status: "success".to_string(),
            tool: crate::test_tool::TOOL_NAME.to_string(),
            message_length: message.chars().count(),
            message,
        }
    }
}
