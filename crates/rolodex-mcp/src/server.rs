//! MCP server implementation.
//!
//! This module provides the main MCP server: JSON-RPC method dispatch, tool
//! discovery and tool execution, plus the stdio transport.

use crate::catalog::{Tool, builtin_registry};
use crate::credential::CredentialResolver;
use crate::error::McpError;
use crate::executor::ToolExecutor;
use crate::http_transport::HttpServer;
use crate::protocol::*;
use crate::tools::ToolRegistry;
use rolodex_core::{McpConfig, Transport};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// The MCP server.
pub struct McpServer {
    config: McpConfig,
    tools: ToolRegistry,
    executor: ToolExecutor,
    credentials: CredentialResolver,
    header_names: Vec<String>,
}

impl McpServer {
    /// Create a server exposing every tool through `executor`.
    pub fn new(config: McpConfig, executor: ToolExecutor) -> Result<Self, McpError> {
        Ok(Self {
            tools: builtin_registry(executor.limits())?,
            config,
            executor,
            credentials: CredentialResolver::default(),
            header_names: rolodex_core::CredentialConfig::default().headers,
        })
    }

    /// Set the credential resolver (fallback credential).
    pub fn with_credentials(mut self, credentials: CredentialResolver) -> Self {
        self.credentials = credentials;
        self
    }

    /// Set the request headers searched for a credential, in order.
    pub fn with_header_names(mut self, names: Vec<String>) -> Self {
        self.header_names = names;
        self
    }

    pub fn config(&self) -> &McpConfig {
        &self.config
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn executor(&self) -> &ToolExecutor {
        &self.executor
    }

    pub fn credentials(&self) -> &CredentialResolver {
        &self.credentials
    }

    pub fn header_names(&self) -> &[String] {
        &self.header_names
    }

    /// Start the MCP server on the configured transport.
    pub async fn run(self) -> Result<(), McpError> {
        match self.config.transport {
            Transport::Stdio => self.run_stdio().await,
            Transport::Http => self.run_http().await,
        }
    }

    /// Run the server with stdio transport.
    ///
    /// Reads newline-delimited JSON-RPC from stdin and writes responses to
    /// stdout. Only the fallback credential is available here.
    pub async fn run_stdio(&self) -> Result<(), McpError> {
        tracing::info!("Starting MCP server with stdio transport");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();

        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let response = match serde_json::from_str::<JsonRpcRequest>(line) {
                Ok(request) => self.handle_message(request).await,
                Err(e) => {
                    tracing::warn!(error = %e, "Discarding unparseable stdio message");
                    Some(JsonRpcResponse::error(
                        None,
                        error_codes::PARSE_ERROR,
                        format!("Parse error: {}", e),
                    ))
                }
            };

            if let Some(response) = response {
                let mut out = serde_json::to_vec(&response)?;
                out.push(b'\n');
                stdout.write_all(&out).await?;
                stdout.flush().await?;
            }
        }

        tracing::info!("stdin closed, stopping MCP server");
        Ok(())
    }

    /// Run the server with HTTP transport.
    pub async fn run_http(self) -> Result<(), McpError> {
        tracing::info!(
            addr = %self.config.bind_addr(),
            "Starting MCP server with HTTP transport"
        );
        HttpServer::new(Arc::new(self)).run().await
    }

    /// Handle one incoming message. Notifications get no response.
    pub async fn handle_message(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            tracing::debug!(method = %request.method, "Received notification");
            return None;
        }
        Some(self.handle_request(request).await)
    }

    /// Handle a JSON-RPC request.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.clone();

        match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "initialized" | "notifications/initialized" => JsonRpcResponse::success(id, json!({})),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => self.handle_list_tools(id),
            "tools/call" => self.handle_call_tool(id, request.params).await,
            "shutdown" => self.handle_shutdown(id),
            _ => JsonRpcResponse::error(
                id,
                error_codes::METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            ),
        }
    }

    fn handle_initialize(&self, id: Option<Value>) -> JsonRpcResponse {
        let result = json!({
            "protocolVersion": PROTOCOL_VERSION,
            "serverInfo": {
                "name": "rolodex-mcp",
                "version": env!("CARGO_PKG_VERSION")
            },
            "capabilities": {
                "tools": {
                    "listChanged": false
                }
            }
        });
        JsonRpcResponse::success(id, result)
    }

    fn handle_list_tools(&self, id: Option<Value>) -> JsonRpcResponse {
        let response = ListToolsResponse {
            tools: self.tools.list().into_iter().cloned().collect(),
        };
        match serde_json::to_value(response) {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(e) => JsonRpcResponse::error(id, error_codes::INTERNAL_ERROR, e.to_string()),
        }
    }

    async fn handle_call_tool(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        match self.call_tool(params).await {
            Ok(response) => match serde_json::to_value(response) {
                Ok(result) => JsonRpcResponse::success(id, result),
                Err(e) => JsonRpcResponse::error(id, error_codes::INTERNAL_ERROR, e.to_string()),
            },
            Err(e) => {
                tracing::warn!(code = e.code(), error = %e, "Tool call rejected");
                JsonRpcResponse::error(id, e.code(), e.to_string())
            }
        }
    }

    async fn call_tool(&self, params: Option<Value>) -> Result<CallToolResponse, McpError> {
        let params: CallToolParams = match params {
            Some(p) => serde_json::from_value(p).map_err(|e| McpError::InvalidArguments {
                tool: "tools/call".to_string(),
                reason: format!("Invalid params: {}", e),
            })?,
            None => {
                return Err(McpError::InvalidArguments {
                    tool: "tools/call".to_string(),
                    reason: "Missing params".to_string(),
                });
            }
        };

        let tool = Tool::from_name(&params.name)
            .filter(|tool| self.tools.contains(tool.name()))
            .ok_or_else(|| McpError::ToolNotFound {
                name: params.name.clone(),
            })?;
        self.tools.validate(tool.name(), &params.arguments)?;

        let tenant = self.credentials.resolve()?;
        let result = self
            .executor
            .execute(tool, params.arguments, &tenant)
            .await?;
        Ok(result.into_response())
    }

    fn handle_shutdown(&self, id: Option<Value>) -> JsonRpcResponse {
        tracing::info!("MCP server shutdown requested");
        JsonRpcResponse::success(id, json!(null))
    }
}
