//! End-to-end tests: spawn the server binaries and talk MCP over stdio.

use rmcp::model::{CallToolRequestParam, CallToolResult};
use rmcp::service::RunningService;
use rmcp::transport::{ConfigureCommandExt, TokioChildProcess};
use rmcp::{RoleClient, ServiceExt};
use serde_json::json;
use tokio::process::Command;

const ULTRA_MINIMAL: &str = env!("CARGO_BIN_EXE_ultra-minimal-server");
const MINIMAL_TEST: &str = env!("CARGO_BIN_EXE_minimal-test-server");

async fn connect(binary: &str) -> RunningService<RoleClient, ()> {
    let transport = TokioChildProcess::new(Command::new(binary).configure(|cmd| {
        cmd.env("RUST_LOG", "warn");
    }))
    .expect("spawn server binary");

    ().serve(transport).await.expect("MCP handshake")
}

fn call(tool: &'static str, arguments: serde_json::Value) -> CallToolRequestParam {
    CallToolRequestParam {
        name: tool.into(),
        arguments: arguments.as_object().cloned(),
    }
}

fn single_text(result: &CallToolResult) -> String {
    assert_eq!(result.content.len(), 1, "expected one content block");
    result.content[0]
        .as_text()
        .expect("text content")
        .text
        .clone()
}

#[tokio::test]
async fn test_ultra_minimal_lists_only_echo() {
    let client = connect(ULTRA_MINIMAL).await;

    let tools = client.list_all_tools().await.unwrap();
    let names: Vec<_> = tools.iter().map(|t| t.name.to_string()).collect();
    assert_eq!(names, vec!["echo"]);

    client.cancel().await.unwrap();
}

#[tokio::test]
async fn test_ultra_minimal_echoes_message() {
    let client = connect(ULTRA_MINIMAL).await;

    let result = client
        .call_tool(call("echo", json!({ "message": "hello from rust" })))
        .await
        .unwrap();
    assert_eq!(single_text(&result), "Echo: hello from rust");

    client.cancel().await.unwrap();
}

#[tokio::test]
async fn test_ultra_minimal_rejects_unknown_tool() {
    let client = connect(ULTRA_MINIMAL).await;

    let result = client
        .call_tool(call("test_tool", json!({ "message": "x" })))
        .await;
    assert!(result.is_err(), "unknown tool must be a protocol error");

    // The session survives the error.
    let result = client
        .call_tool(call("echo", json!({ "message": "still alive" })))
        .await
        .unwrap();
    assert_eq!(single_text(&result), "Echo: still alive");

    client.cancel().await.unwrap();
}

#[tokio::test]
async fn test_ultra_minimal_rejects_missing_message() {
    let client = connect(ULTRA_MINIMAL).await;

    let result = client.call_tool(call("echo", json!({}))).await;
    assert!(result.is_err());

    client.cancel().await.unwrap();
}

#[tokio::test]
async fn test_minimal_test_server_reports_json() {
    let client = connect(MINIMAL_TEST).await;

    let tools = client.list_all_tools().await.unwrap();
    let names: Vec<_> = tools.iter().map(|t| t.name.to_string()).collect();
    assert_eq!(names, vec!["test_tool"]);

    let result = client
        .call_tool(call("test_tool", json!({ "message": "ping" })))
        .await
        .unwrap();
    let report: serde_json::Value = serde_json::from_str(&single_text(&result)).unwrap();

    assert_eq!(report["status"], "success");
    assert_eq!(report["tool"], "test_tool");
    assert_eq!(report["message"], "ping");

    client.cancel().await.unwrap();
}

#[tokio::test]
async fn test_server_info_advertises_tools() {
    let client = connect(MINIMAL_TEST).await;

    let info = client.peer_info().expect("server info after handshake");
    assert!(info.capabilities.tools.is_some());
    assert!(info.instructions.is_some());

    client.cancel().await.unwrap();
}
