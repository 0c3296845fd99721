//! Export and query-limit configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for persisted export artifacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory holding persisted artifacts, one sub-directory per tenant.
    #[serde(default = "default_directory")]
    pub directory: PathBuf,

    /// Public base URL of the HTTP transport, used to build download links.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_base_url: Option<String>,

    /// Maximum characters per cell in table exports.
    #[serde(default = "default_cell_max")]
    pub table_cell_max_chars: usize,

    /// Maximum characters of the free-text biography in table exports.
    #[serde(default = "default_about_max")]
    pub about_max_chars: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            public_base_url: None,
            table_cell_max_chars: default_cell_max(),
            about_max_chars: default_about_max(),
        }
    }
}

/// Row limits applied to query tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Default `limit` for `search_network`.
    #[serde(default = "default_search_limit")]
    pub default_search_limit: u32,

    /// Default `limit` for `filter_by_keywords`.
    #[serde(default = "default_filter_limit")]
    pub default_filter_limit: u32,

    /// Upper bound accepted for any `limit` argument.
    #[serde(default = "default_max_rows")]
    pub max_rows_per_query: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            default_search_limit: default_search_limit(),
            default_filter_limit: default_filter_limit(),
            max_rows_per_query: default_max_rows(),
        }
    }
}

fn default_directory() -> PathBuf {
    PathBuf::from("exports")
}

fn default_cell_max() -> usize {
    40
}

fn default_about_max() -> usize {
    200
}

fn default_search_limit() -> u32 {
    10
}

fn default_filter_limit() -> u32 {
    20
}

fn default_max_rows() -> u32 {
    1000
}
