//! # rolodex-mcp
//!
//! MCP (Model Context Protocol) server exposing a contact network as five
//! read-only tools. Every call is answered for exactly one tenant: the one
//! identified by the credential attached to that call.
//!
//! ```text
//! AI Agent
//!       │
//!       │ MCP protocol (list tools / call tool)
//!       ▼
//! ┌──────────────────────┐
//! │  Rolodex MCP Server  │
//! │  1. Validate args    │  ← tools (JSON Schema)
//! │  2. Resolve tenant   │  ← credential (header, then fallback)
//! │  3. Run the tool     │  ← rolodex-store / rolodex-export
//! │  4. Return JSON      │
//! └──────────┬───────────┘
//!            │
//!            ▼
//!      Upstream Postgres
//! ```
//!
//! ## Example Usage
//!
//! ```ignore
//! use rolodex_mcp::{McpServer, ToolExecutor, CredentialResolver};
//!
//! let executor = ToolExecutor::new(store, Exporter::new(config.export.clone()), config.limits.clone());
//! McpServer::new(config.mcp.clone(), executor)?
//!     .with_credentials(CredentialResolver::from_config(&config.credentials))
//!     .run()
//!     .await?;
//! ```

pub mod catalog;
pub mod credential;
pub mod error;
pub mod executor;
pub mod http_transport;
pub mod protocol;
pub mod server;
pub mod tools;

pub use catalog::{Tool, builtin_registry};
pub use credential::CredentialResolver;
pub use error::McpError;
pub use executor::{ExecutionResult, ToolExecutor};
pub use http_transport::{HttpServer, create_router};
pub use protocol::{
    CallToolParams, CallToolResponse, JsonRpcRequest, JsonRpcResponse, ToolAnnotations,
    ToolContent, ToolDefinition,
};
pub use server::McpServer;
pub use tools::ToolRegistry;
