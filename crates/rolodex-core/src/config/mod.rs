//! Configuration types for Rolodex.
//!
//! A single YAML file (`rolodex.yaml` by default) is deserialized into
//! [`RolodexConfig`]. Every section and field has a default, so an empty or
//! missing file yields a usable configuration; the binary layers CLI flags and
//! environment variables on top.
//!
//! ```yaml
//! upstream:
//!   database_url_env: DATABASE_URL
//!   table: people
//!   tenant_column: user_id
//!   pool:
//!     max_connections: 10
//! mcp:
//!   transport: http
//!   port: 8000
//! credential:
//!   fallback_env: API_KEY
//!   http_fallback: false
//! export:
//!   directory: exports
//! ```

pub mod export;
pub mod mcp;
pub mod upstream;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub use export::{ExportConfig, LimitsConfig};
pub use mcp::{CredentialConfig, McpConfig, Transport};
pub use upstream::{ConnectionPoolConfig, SslMode, UpstreamConfig};

/// Complete Rolodex configuration loaded from a file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RolodexConfig {
    /// Project name, used only in logs.
    #[serde(default)]
    pub project: Option<String>,

    /// Upstream Postgres connection and contact table.
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// MCP server settings.
    #[serde(default)]
    pub mcp: McpConfig,

    /// Credential lookup settings.
    #[serde(default)]
    pub credential: CredentialConfig,

    /// Export artifact settings.
    #[serde(default)]
    pub export: ExportConfig,

    /// Query row limits.
    #[serde(default)]
    pub limits: LimitsConfig,
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl RolodexConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content. Empty content yields defaults.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Check values that would otherwise only fail at query time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (what, ident) in [
            ("upstream.table", &self.upstream.table),
            ("upstream.tenant_column", &self.upstream.tenant_column),
            ("upstream.id_column", &self.upstream.id_column),
        ] {
            if !is_valid_identifier(ident) {
                return Err(ConfigError::Config(format!(
                    "{} '{}' is not a plain SQL identifier",
                    what, ident
                )));
            }
        }

        let limits = &self.limits;
        if limits.max_rows_per_query == 0 {
            return Err(ConfigError::Config(
                "limits.max_rows_per_query must be at least 1".to_string(),
            ));
        }
        if limits.default_search_limit > limits.max_rows_per_query
            || limits.default_filter_limit > limits.max_rows_per_query
        {
            return Err(ConfigError::Config(
                "default limits must not exceed limits.max_rows_per_query".to_string(),
            ));
        }

        Ok(())
    }
}

/// Whether `ident` can be spliced into SQL text as a table or column name.
///
/// Accepts ASCII letters, digits and underscores, not starting with a digit.
pub fn is_valid_identifier(ident: &str) -> bool {
    let mut chars = ident.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
