//! MCP server configuration.
//!
//! Transport selection and network settings for the MCP server, plus the
//! headers consulted for the per-call credential.

use serde::{Deserialize, Serialize};

/// Configuration for the MCP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpConfig {
    /// Transport type: "stdio" or "http".
    #[serde(default)]
    pub transport: Transport,

    /// HTTP bind host (only used when transport is HTTP).
    #[serde(default = "default_http_host")]
    pub host: String,

    /// HTTP port (only used when transport is HTTP).
    #[serde(default = "default_http_port")]
    pub port: u16,

    /// Interval between SSE keep-alive pings, in seconds.
    #[serde(default = "default_keep_alive")]
    pub sse_keep_alive_seconds: u64,
}

/// MCP transport type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// Standard input/output transport (for desktop MCP clients).
    #[default]
    Stdio,
    /// HTTP transport (streamable POST and legacy SSE).
    Http,
}

impl std::str::FromStr for Transport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "stdio" => Ok(Transport::Stdio),
            "http" => Ok(Transport::Http),
            other => Err(format!("unknown transport '{}', use 'stdio' or 'http'", other)),
        }
    }
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            transport: Transport::default(),
            host: default_http_host(),
            port: default_http_port(),
            sse_keep_alive_seconds: default_keep_alive(),
        }
    }
}

impl McpConfig {
    /// Address the HTTP transport binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if using HTTP transport.
    pub fn is_http(&self) -> bool {
        self.transport == Transport::Http
    }
}

/// Where the per-call tenant credential is looked up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialConfig {
    /// Environment variable holding the fallback credential used when a call
    /// carries none (stdio and local use).
    #[serde(default = "default_fallback_env")]
    pub fallback_env: String,

    /// Whether HTTP requests without a credential header may use the
    /// fallback. When false the fallback only serves stdio.
    #[serde(default = "default_true")]
    pub http_fallback: bool,

    /// Request headers checked in order; the first non-empty one wins.
    /// A `Bearer ` prefix is stripped.
    #[serde(default = "default_headers")]
    pub headers: Vec<String>,
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            fallback_env: default_fallback_env(),
            http_fallback: true,
            headers: default_headers(),
        }
    }
}

impl CredentialConfig {
    /// Read the fallback credential from the environment.
    pub fn fallback_from_env(&self) -> Option<String> {
        std::env::var(&self.fallback_env)
            .ok()
            .filter(|v| !v.trim().is_empty())
    }
}

fn default_http_host() -> String {
    "127.0.0.1".to_string()
}

fn default_http_port() -> u16 {
    8000
}

fn default_keep_alive() -> u64 {
    30
}

fn default_fallback_env() -> String {
    "API_KEY".to_string()
}

fn default_true() -> bool {
    true
}

fn default_headers() -> Vec<String> {
    ["api_key", "x-api-key", "api-key", "authorization"]
        .into_iter()
        .map(String::from)
        .collect()
}
