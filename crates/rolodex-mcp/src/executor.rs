//! Tool execution engine.
//!
//! Maps validated tool calls onto the contact store and exporter for one
//! tenant and turns the outcome into MCP content. Store and export failures
//! never escape as JSON-RPC errors: they are logged and reported as a
//! `{"status": "error"}` payload with `isError` set.

use crate::catalog::Tool;
use crate::error::McpError;
use crate::protocol::{CallToolResponse, ToolContent};
use rolodex_core::{ContactRecord, LimitsConfig, TenantId};
use rolodex_export::{Artifact, ExportError, ExportFormat, ExportRequest, ExportTarget, Exporter};
use rolodex_store::{ContactStore, StoreError};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

/// Result of a tool execution.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    /// Whether the execution was successful.
    pub success: bool,
    /// The JSON payload returned to the caller.
    pub payload: Value,
}

impl ExecutionResult {
    /// Create a successful result with JSON content.
    pub fn success_json(value: Value) -> Self {
        Self {
            success: true,
            payload: value,
        }
    }

    /// Create an error result.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            payload: json!({"status": "error", "message": message.into()}),
        }
    }

    /// MCP `tools/call` result: one text item holding the pretty-printed
    /// payload.
    pub fn into_response(self) -> CallToolResponse {
        let text = serde_json::to_string_pretty(&self.payload)
            .unwrap_or_else(|_| self.payload.to_string());
        CallToolResponse {
            content: vec![ToolContent::Text { text }],
            is_error: !self.success,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchArgs {
    query: String,
    limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ProfileArgs {
    name: String,
}

#[derive(Debug, Deserialize)]
struct KeywordArgs {
    keywords: Vec<String>,
    limit: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Destination {
    #[default]
    Inline,
    File,
}

#[derive(Debug, Default, Deserialize)]
struct ExportArgs {
    #[serde(default)]
    format: ExportFormat,
    #[serde(default)]
    destination: Destination,
    file_name: Option<String>,
}

/// The tool executor runs tools against the contact store.
pub struct ToolExecutor {
    store: Arc<dyn ContactStore>,
    exporter: Exporter,
    limits: LimitsConfig,
}

impl ToolExecutor {
    /// Create a new tool executor.
    pub fn new(store: Arc<dyn ContactStore>, exporter: Exporter, limits: LimitsConfig) -> Self {
        Self {
            store,
            exporter,
            limits,
        }
    }

    pub fn limits(&self) -> &LimitsConfig {
        &self.limits
    }

    /// Execute a tool for `tenant`.
    ///
    /// `arguments` must already have passed schema validation; a payload
    /// that still does not deserialize is reported as invalid arguments.
    pub async fn execute(
        &self,
        tool: Tool,
        arguments: Value,
        tenant: &TenantId,
    ) -> Result<ExecutionResult, McpError> {
        tracing::debug!(tool = %tool, tenant = %tenant, "Executing tool");

        let outcome = match tool {
            Tool::SearchNetwork => {
                let args: SearchArgs = parse_args(tool, arguments)?;
                let limit = self.cap(args.limit, self.limits.default_search_limit);
                self.store
                    .search(tenant, &args.query, limit)
                    .await
                    .map(|records| records_payload(&records))
                    .map_err(ToolFailure::from)
            }
            Tool::GetProfile => {
                let args: ProfileArgs = parse_args(tool, arguments)?;
                self.store
                    .get_one(tenant, &args.name)
                    .await
                    .map(|found| match found {
                        Some(record) => record.to_json(),
                        None => json!({
                            "status": "not_found",
                            "message": format!("No contact found matching '{}'", args.name)
                        }),
                    })
                    .map_err(ToolFailure::from)
            }
            Tool::FilterByKeywords => {
                let args: KeywordArgs = parse_args(tool, arguments)?;
                let limit = self.cap(args.limit, self.limits.default_filter_limit);
                self.store
                    .filter_by_keywords(tenant, &args.keywords, limit)
                    .await
                    .map(|records| records_payload(&records))
                    .map_err(ToolFailure::from)
            }
            Tool::AnalyzeNetwork => self
                .store
                .aggregate(tenant)
                .await
                .map_err(ToolFailure::from)
                .and_then(|analysis| serde_json::to_value(analysis).map_err(ToolFailure::from)),
            Tool::ExportNetwork => {
                let args: ExportArgs = parse_args(tool, arguments)?;
                let request = ExportRequest {
                    format: args.format,
                    target: match args.destination {
                        Destination::Inline => ExportTarget::Inline,
                        Destination::File => ExportTarget::File {
                            name: args.file_name,
                        },
                    },
                };
                self.exporter
                    .export(self.store.as_ref(), tenant, &request)
                    .await
                    .map(|outcome| outcome.to_payload())
                    .map_err(ToolFailure::from)
            }
        };

        Ok(match outcome {
            Ok(payload) => ExecutionResult::success_json(payload),
            Err(failure) => {
                tracing::error!(
                    tool = %tool,
                    tenant = %tenant,
                    error = %failure.0,
                    "Tool execution failed"
                );
                ExecutionResult::error(failure.0)
            }
        })
    }

    /// Fetch (or regenerate) one of the tenant's export artifacts.
    pub async fn retrieve_artifact(
        &self,
        tenant: &TenantId,
        name: &str,
    ) -> Result<Option<Artifact>, ExportError> {
        self.exporter
            .retrieve(self.store.as_ref(), tenant, name)
            .await
    }

    fn cap(&self, requested: Option<u32>, default: u32) -> u32 {
        requested
            .unwrap_or(default)
            .clamp(1, self.limits.max_rows_per_query)
    }
}

/// Message of a failed store or export call, already safe to show callers.
struct ToolFailure(String);

impl From<StoreError> for ToolFailure {
    fn from(e: StoreError) -> Self {
        Self(e.to_string())
    }
}

impl From<ExportError> for ToolFailure {
    fn from(e: ExportError) -> Self {
        Self(e.to_string())
    }
}

impl From<serde_json::Error> for ToolFailure {
    fn from(e: serde_json::Error) -> Self {
        Self(e.to_string())
    }
}

fn parse_args<T: for<'de> Deserialize<'de>>(tool: Tool, arguments: Value) -> Result<T, McpError> {
    serde_json::from_value(arguments).map_err(|e| McpError::InvalidArguments {
        tool: tool.name().to_string(),
        reason: e.to_string(),
    })
}

fn records_payload(records: &[ContactRecord]) -> Value {
    Value::Array(records.iter().map(ContactRecord::to_json).collect())
}
