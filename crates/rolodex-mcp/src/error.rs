//! Error types for the MCP crate.

use crate::protocol::error_codes;
use thiserror::Error;

/// Errors that can occur in the MCP server.
#[derive(Debug, Error)]
pub enum McpError {
    /// Failed to start the server.
    #[error("failed to start MCP server: {0}")]
    StartupFailed(String),

    /// Tool not found.
    #[error("tool not found: {name}")]
    ToolNotFound { name: String },

    /// Invalid arguments for tool.
    #[error("invalid arguments for tool {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },

    /// No credential in the call scope and no fallback configured.
    #[error("no API key provided (send an api_key, x-api-key or Authorization header)")]
    MissingCredential,

    /// A tool schema failed to compile.
    #[error("invalid schema for tool {tool}: {reason}")]
    InvalidSchema { tool: String, reason: String },

    /// Serialization error.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl McpError {
    /// JSON-RPC error code reported for this error.
    pub fn code(&self) -> i32 {
        match self {
            Self::MissingCredential => error_codes::MISSING_CREDENTIAL,
            Self::ToolNotFound { .. } | Self::InvalidArguments { .. } => {
                error_codes::INVALID_PARAMS
            }
            Self::SerializationError(_) => error_codes::PARSE_ERROR,
            _ => error_codes::INTERNAL_ERROR,
        }
    }
}
